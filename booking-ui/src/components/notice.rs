use yew::prelude::*;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
    Warning,
    Success,
}

/// Transient message shown above the wizard until dismissed.
#[derive(Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct NoticeBannerProps {
    pub notice: Notice,
    pub on_dismiss: Callback<()>,
}

#[function_component(NoticeBanner)]
pub fn notice_banner(props: &NoticeBannerProps) -> Html {
    let level = match props.notice.level {
        NoticeLevel::Error => "error",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Success => "success",
    };
    let on_dismiss = props.on_dismiss.reform(|_: MouseEvent| ());

    html! {
        <div class="booking-notice" role="alert" data-level={level}>
            <span>{ props.notice.message.clone() }</span>
            <button type="button" onclick={on_dismiss} aria-label="Dismiss">{"×"}</button>
        </div>
    }
}
