use std::borrow::Cow;

#[strata_derive::strata_error]
pub enum ValueError {
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ValueError {
    pub(crate) fn mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch {
            message: format!("expected {expected}, found {found}").into(),
            context: None,
        }
    }
}
