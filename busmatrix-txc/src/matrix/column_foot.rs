/// one footnote cell under a grouping's columns. `notes` is `None` for
/// spacer cells spanning columns the note does not apply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFoot {
    pub notes: Option<String>,
    pub span: usize,
}

impl ColumnFoot {
    pub fn noted(text: impl Into<String>, span: usize) -> ColumnFoot {
        ColumnFoot {
            notes: Some(text.into()),
            span,
        }
    }

    pub fn spacer(span: usize) -> ColumnFoot {
        ColumnFoot { notes: None, span }
    }
}
