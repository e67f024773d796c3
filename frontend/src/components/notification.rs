use gloo_timers::callback::Timeout;
use log::debug;
use stylist::yew::styled_component;
use yew::prelude::*;

use crate::dom;
use crate::error::EnhanceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
    Success,
}

impl Severity {
    pub fn from_category(category: &str) -> Self {
        match category.trim().to_ascii_lowercase().as_str() {
            "error" | "danger" | "warning" => Severity::Error,
            "success" => Severity::Success,
            _ => Severity::Info,
        }
    }

    pub fn background(self) -> &'static str {
        match self {
            Severity::Info => "#1E90FF",
            Severity::Error => "#FF004D",
            Severity::Success => "#00B37E",
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            Severity::Info => "notification-info",
            Severity::Error => "notification-error",
            Severity::Success => "notification-success",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Shown,
    Leaving,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    pub display_ms: u32,
    pub fade_ms: u32,
}

impl Lifecycle {
    pub fn lifetime_ms(&self) -> u32 {
        self.display_ms.saturating_add(self.fade_ms)
    }

    pub fn phase_at(&self, elapsed_ms: u32) -> Phase {
        if elapsed_ms >= self.lifetime_ms() {
            Phase::Removed
        } else if elapsed_ms >= self.display_ms {
            Phase::Leaving
        } else {
            Phase::Shown
        }
    }

    pub fn transitions(&self) -> [(u32, Phase); 2] {
        [self.display_ms, self.lifetime_ms()].map(|at| (at, self.phase_at(at)))
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastProps {
    pub message: String,
    pub severity: Severity,
    pub lifecycle: Lifecycle,
}

#[styled_component]
pub fn Toast(props: &ToastProps) -> Html {
    let phase = use_state(|| Phase::Shown);

    {
        let phase = phase.setter();
        use_effect_with_deps(
            move |lifecycle: &Lifecycle| {
                let timeouts: Vec<Timeout> = lifecycle
                    .transitions()
                    .into_iter()
                    .map(|(at, next)| {
                        let phase = phase.clone();
                        Timeout::new(at, move || phase.set(next))
                    })
                    .collect();
                move || drop(timeouts)
            },
            props.lifecycle,
        );
    }

    let class = css!(
        r#"
            position: fixed;
            top: 20px;
            right: 20px;
            max-width: 360px;
            padding: 14px 20px;
            border-radius: 8px;
            color: #fff;
            font-weight: 500;
            box-shadow: 0 8px 24px rgba(0, 0, 0, 0.3);
            z-index: 10000;
        "#
    );

    let opacity = match *phase {
        Phase::Shown => 1,
        Phase::Leaving => 0,
        Phase::Removed => return html! {},
    };
    let style = format!(
        "background: {}; opacity: {}; transition: opacity {}ms ease;",
        props.severity.background(),
        opacity,
        props.lifecycle.fade_ms,
    );

    html! {
        <div
            class={classes!(class, "notification", props.severity.class_name())}
            role="alert"
            style={style}
        >
            { &props.message }
        </div>
    }
}

/// Fire-and-forget notifications rendered into their own host element.
#[derive(Debug, Clone, Copy)]
pub struct Notifier {
    lifecycle: Lifecycle,
}

impl Notifier {
    pub fn new(lifecycle: Lifecycle) -> Self {
        Self { lifecycle }
    }

    pub fn notify(&self, message: &str, severity: Severity) -> Result<(), EnhanceError> {
        let document = dom::document()?;
        let body = dom::body(&document)?;
        let host = document.create_element("div")?;
        host.set_class_name("notification-host");
        body.append_child(&host)?;

        let handle = yew::Renderer::<Toast>::with_root_and_props(
            host.clone(),
            ToastProps {
                message: message.to_string(),
                severity,
                lifecycle: self.lifecycle,
            },
        )
        .render();

        debug!("Notification ({:?}): {}", severity, message);
        Timeout::new(self.lifecycle.lifetime_ms(), move || {
            handle.destroy();
            host.remove();
        })
        .forget();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: Lifecycle = Lifecycle {
        display_ms: 3000,
        fade_ms: 300,
    };

    #[test]
    fn notification_is_gone_after_its_lifetime() {
        assert_eq!(DEFAULT.lifetime_ms(), 3300);
        assert_eq!(DEFAULT.phase_at(0), Phase::Shown);
        assert_eq!(DEFAULT.phase_at(2999), Phase::Shown);
        assert_eq!(DEFAULT.phase_at(3000), Phase::Leaving);
        assert_eq!(DEFAULT.phase_at(3299), Phase::Leaving);
        assert_eq!(DEFAULT.phase_at(3300), Phase::Removed);
        assert_eq!(DEFAULT.phase_at(10_000), Phase::Removed);
    }

    #[test]
    fn toast_fades_before_it_is_removed() {
        assert_eq!(
            DEFAULT.transitions(),
            [(3000, Phase::Leaving), (3300, Phase::Removed)]
        );
    }

    #[test]
    fn huge_lifetimes_saturate() {
        let lifecycle = Lifecycle {
            display_ms: u32::MAX,
            fade_ms: 300,
        };
        assert_eq!(lifecycle.lifetime_ms(), u32::MAX);
        assert_eq!(lifecycle.phase_at(u32::MAX - 1), Phase::Shown);
    }

    #[test]
    fn severities_have_distinct_colours() {
        let colours =
            [Severity::Info, Severity::Error, Severity::Success].map(Severity::background);
        assert_ne!(colours[0], colours[1]);
        assert_ne!(colours[1], colours[2]);
        assert_ne!(colours[0], colours[2]);
        assert_eq!(Severity::Error.class_name(), "notification-error");
    }

    #[test]
    fn flash_categories_map_to_severities() {
        assert_eq!(Severity::from_category("error"), Severity::Error);
        assert_eq!(Severity::from_category(" Danger "), Severity::Error);
        assert_eq!(Severity::from_category("success"), Severity::Success);
        assert_eq!(Severity::from_category("message"), Severity::Info);
        assert_eq!(Severity::from_category(""), Severity::Info);
    }
}
