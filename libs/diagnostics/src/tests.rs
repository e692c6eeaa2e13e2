use crate::*;

#[derive(Debug, Clone)]
pub struct TestIssue {
    severity: Severity,
}

impl Display for TestIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.severity)
    }
}

impl Diagnostic for TestIssue {
    fn severity(&self) -> Severity {
        self.severity
    }
}

impl From<Severity> for TestIssue {
    fn from(severity: Severity) -> Self {
        Self { severity }
    }
}

#[test]
fn issue_set_counters() {
    let mut issues: IssueSet<TestIssue> = IssueSet::new();
    issues.add(Severity::Info.into());
    assert_eq!(issues.num_errors(), 0);
    assert_eq!(issues.num_warnings(), 0);
    assert!(!issues.has_error());
    assert!(!issues.has_warning());
    issues.add(Severity::Warning.into());
    assert_eq!(issues.num_warnings(), 1);
    assert!(issues.has_warning());
    issues.add(Severity::Error.into());
    assert_eq!(issues.num_errors(), 1);
    assert!(issues.has_error());
    assert!(!issues.has_fatal());
    issues.add(Severity::Fatal.into());
    assert_eq!(issues.num_fatal(), 1);
    assert!(issues.has_fatal());
    assert!(issues.has_error());
    assert_eq!(issues.len(), 4);
}

#[test]
fn worst_severity_tracks_fatal() {
    let mut issues: IssueSet<TestIssue> = IssueSet::new();
    assert_eq!(issues.worst_severity(), None);
    issues.add(Severity::Warning.into());
    assert_eq!(issues.worst_severity(), Some(Severity::Warning));
    issues.add(Severity::Fatal.into());
    issues.add(Severity::Info.into());
    assert_eq!(issues.worst_severity(), Some(Severity::Fatal));
}

#[test]
fn default_severity_is_warning() {
    assert_eq!(Severity::default(), Severity::Warning);
}

#[test]
fn severity_as_tracing_level() {
    assert_eq!(Severity::Info.as_tracing_level(), tracing::Level::INFO);
    assert_eq!(Severity::Warning.as_tracing_level(), tracing::Level::WARN);
    assert_eq!(Severity::Error.as_tracing_level(), tracing::Level::ERROR);
    assert_eq!(Severity::Fatal.as_tracing_level(), tracing::Level::ERROR);
}

#[test]
fn severity_predicates() {
    assert!(!Severity::Warning.is_error());
    assert!(Severity::Error.is_error());
    assert!(Severity::Fatal.is_error());
    assert!(Severity::Fatal.is_fatal());
    assert!(!Severity::Error.is_fatal());
}

#[test]
fn default_help_is_none() {
    assert!(TestIssue {
        severity: Severity::Warning,
    }
    .help()
    .is_none());
}
