use crate::render::RenderedView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoticeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeTone {
    Success,
    Error,
}

/// Inline, time-boxed feedback for the enroll form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub tone: NoticeTone,
    pub text: String,
}

/// Output sink for everything the user sees.
///
/// `mount` always receives a complete view that replaces whatever was shown
/// before. Notices and alerts are separate channels: notices sit inline next
/// to the enroll form and expire, alerts interrupt the user immediately.
pub trait ViewSurface: Send + Sync {
    fn mount(&self, view: &RenderedView);
    fn show_notice(&self, notice: &Notice);
    /// Clears `id` if it is still the notice on display.
    fn clear_notice(&self, id: NoticeId);
    fn alert(&self, text: &str);
    fn reset_enroll_form(&self);
}
