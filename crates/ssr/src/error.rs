#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetError {
    /// Interleaving was requested outside a server context.
    UnsupportedEnvironment { reason: &'static str },
    /// Styles were collected or read after streaming had begun.
    AlreadySealed,
}

impl std::fmt::Display for SheetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetError::UnsupportedEnvironment { reason } => write!(
                f,
                "streaming style interleaving is only supported on the server: {reason}"
            ),
            SheetError::AlreadySealed => f.write_str(
                "styles can't be collected or read once a ServerStyleSheet has started \
                 streaming; use one sheet per render",
            ),
        }
    }
}

impl std::error::Error for SheetError {}
