/// How far through its working set a session is.
///
/// `answered` counts scored questions, so revisits in practice mode do not
/// inflate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}
