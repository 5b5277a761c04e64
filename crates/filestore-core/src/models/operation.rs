use std::fmt::{Display, Formatter, Result as FmtResult};

/// Category of a bounded operation; each has its own admission pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Upload,
    Download,
    List,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::Upload,
        OperationKind::Download,
        OperationKind::List,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Upload => "upload",
            OperationKind::Download => "download",
            OperationKind::List => "list",
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
