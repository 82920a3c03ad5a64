use once_cell::sync::Lazy;

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

/// Width at or below which the window switches to the single-panel layout.
pub const NARROW_WIDTH: i32 = 768;

pub fn spawn_async<F>(fut: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    RUNTIME.spawn(fut);
}

/// Run `fut` on the tokio runtime and hand its output to `on_done` on the
/// GTK main loop.
#[cfg(feature = "gui")]
pub fn run_async_to_main<T, Fut, F>(fut: Fut, on_done: F)
where
    T: Send + 'static,
    Fut: std::future::Future<Output = T> + Send + 'static,
    F: FnOnce(T) + 'static,
{
    let (tx, rx) = tokio::sync::oneshot::channel::<T>();
    spawn_async(async move {
        let _ = tx.send(fut.await);
    });
    glib::MainContext::default().spawn_local(async move {
        if let Ok(res) = rx.await {
            on_done(res);
        }
    });
}

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Look `name` up in a `Cookie` header value (`a=1; b=2`), percent-decoding
/// the value.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
        .map(|raw| {
            url::form_urlencoded::parse(format!("v={raw}").as_bytes())
                .next()
                .map(|(_, v)| v.into_owned())
                .unwrap_or_else(|| raw.to_string())
        })
}

pub fn is_narrow(width: i32) -> bool {
    width > 0 && width <= NARROW_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_scheme() {
        assert_eq!(normalize_url(" http://localhost:8000 "), "http://localhost:8000");
        assert_eq!(normalize_url("chat.example.com"), "https://chat.example.com");
    }

    #[test]
    fn cookie_lookup_matches_whole_name() {
        let header = "sessionid=abc; xcsrftoken=nope; csrftoken=tok%20en";
        assert_eq!(cookie_value(header, "csrftoken").as_deref(), Some("tok en"));
        assert_eq!(cookie_value(header, "sessionid").as_deref(), Some("abc"));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn narrow_layout_threshold() {
        assert!(is_narrow(768));
        assert!(!is_narrow(769));
        assert!(!is_narrow(0));
    }
}
