//! Storyboard page: synopsis form, generated script, storyboard form and frames.

use storyboard_core::{
    ColorMode, DetailLevel, ScriptRequest, ScriptStyle, StoryboardFrame, StoryboardOptions,
    StoryboardStyle, VideoDuration,
};

/// Frame width in the page, in pixels.
const FRAME_WIDTH: u32 = 400;

/// Everything one render of the page shows.
#[derive(Debug, Clone, Default)]
pub struct PageView {
    pub title: String,
    /// Last script form values, so the selectors keep the user's choice.
    pub script_form: ScriptRequest,
    /// Stored session script; hidden when empty.
    pub script: String,
    /// Set when the last script request failed.
    pub script_failure: Option<String>,
    pub storyboard_form: StoryboardOptions,
    /// Frames drawn by the last storyboard request, in arrival order.
    pub frames: Vec<StoryboardFrame>,
    /// User-visible storyboard error.
    pub error: Option<String>,
}

pub fn render(view: &PageView) -> String {
    let mut body = String::new();
    body.push_str(&format!("<h1>{}</h1>", html_escape(&view.title)));
    body.push_str(&script_form(&view.script_form));

    if let Some(reason) = &view.script_failure {
        body.push_str(&format!(
            r#"<div class="alert warning" role="alert">Script generation failed: {}</div>"#,
            html_escape(reason)
        ));
    }
    if !view.script.is_empty() {
        body.push_str(&format!(
            r#"<label for="generated-script">Generated Script</label><textarea id="generated-script" rows="15" readonly>
{}</textarea>"#,
            html_escape(&view.script)
        ));
    }

    body.push_str(&storyboard_form(&view.storyboard_form));
    if let Some(error) = &view.error {
        body.push_str(&format!(
            r#"<div class="alert error" role="alert">{}</div>"#,
            html_escape(error)
        ));
    }
    for frame in &view.frames {
        body.push_str(&frame_figure(frame));
    }

    body.push_str(
        r#"<form method="post" action="/session/end" class="session-end"><button type="submit">Start over</button></form>"#,
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{}</title>
<style>
body {{ font-family: sans-serif; margin: 2rem auto; max-width: 960px; }}
textarea {{ width: 100%; }}
.alert {{ padding: 0.75rem; border-radius: 4px; margin: 1rem 0; }}
.alert.error {{ background: #fde2e2; color: #8a1f1f; }}
.alert.warning {{ background: #fff4d6; color: #6b4e00; }}
figure {{ display: inline-block; margin: 0.5rem; }}
</style>
</head>
<body>
{}
</body>
</html>"#,
        html_escape(&view.title),
        body
    )
}

fn script_form(form: &ScriptRequest) -> String {
    let styles: String = ScriptStyle::ALL
        .iter()
        .map(|s| option(s.label(), *s == form.style))
        .collect();
    let durations: String = VideoDuration::ALL
        .iter()
        .map(|d| option(d.label(), *d == form.duration))
        .collect();
    format!(
        r#"<form method="post" action="/script">
<h2>1. Write/Paste Your Synopsis (Optional)</h2>
<label for="synopsis">Your Synopsis</label>
<textarea id="synopsis" name="synopsis" rows="12">
{}</textarea>
<h2>2. Script Details</h2>
<label for="style">Script Style</label>
<select id="style" name="style">{}</select>
<label for="duration">Video Duration</label>
<select id="duration" name="duration">{}</select>
<button type="submit">Generate Script</button>
</form>"#,
        html_escape(&form.synopsis),
        styles,
        durations
    )
}

fn storyboard_form(form: &StoryboardOptions) -> String {
    let radios: String = StoryboardStyle::ALL
        .iter()
        .map(|s| {
            format!(
                r#"<label><input type="radio" name="style" value="{0}"{1}> {0}</label>"#,
                s.label(),
                if *s == form.style { " checked" } else { "" }
            )
        })
        .collect();
    format!(
        r#"<form method="post" action="/storyboard">
<h2>3. Generate Storyboard</h2>
<fieldset><legend>Storyboard Style</legend>{}</fieldset>
<label><input type="checkbox" name="detailed"{}> Detailed</label>
<label><input type="checkbox" name="colored"{}> Colored</label>
<button type="submit">Generate Storyboard</button>
</form>"#,
        radios,
        if form.detail == DetailLevel::Detailed { " checked" } else { "" },
        if form.color == ColorMode::Colored { " checked" } else { "" }
    )
}

fn frame_figure(frame: &StoryboardFrame) -> String {
    format!(
        r#"<figure><img src="{}" alt="Storyboard frame {}" width="{}"><figcaption>{}</figcaption></figure>"#,
        html_escape(&frame.url),
        frame.number,
        FRAME_WIDTH,
        html_escape(&frame.prompt)
    )
}

fn option(label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{0}"{1}>{0}</option>"#,
        label,
        if selected { " selected" } else { "" }
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_script_is_not_shown() {
        let html = render(&PageView {
            title: "AI Storyboard Generator".to_string(),
            ..PageView::default()
        });
        assert!(html.contains("<title>AI Storyboard Generator</title>"));
        assert!(html.contains("1. Write/Paste Your Synopsis (Optional)"));
        assert!(!html.contains("Generated Script"));
    }

    #[test]
    fn frames_are_captioned_and_escaped() {
        let html = render(&PageView {
            frames: vec![StoryboardFrame {
                number: 1,
                url: "https://cdn.test/a.png?x=1&y=2".to_string(),
                prompt: "a <b>bold</b> pier".to_string(),
            }],
            ..PageView::default()
        });
        assert!(html.contains(r#"src="https://cdn.test/a.png?x=1&amp;y=2""#));
        assert!(html.contains("<figcaption>a &lt;b&gt;bold&lt;/b&gt; pier</figcaption>"));
        assert!(html.contains(r#"width="400""#));
    }

    #[test]
    fn selections_are_preserved() {
        let html = render(&PageView {
            script_form: ScriptRequest {
                synopsis: String::new(),
                style: ScriptStyle::Explainer,
                duration: VideoDuration::Minutes5,
            },
            storyboard_form: StoryboardOptions::new(StoryboardStyle::Shaded, true, false),
            ..PageView::default()
        });
        assert!(html.contains(r#"<option value="Explainer" selected>"#));
        assert!(html.contains(r#"<option value="5m" selected>"#));
        assert!(html.contains(r#"value="Shaded" checked"#));
        assert!(html.contains(r#"name="detailed" checked"#));
        assert!(html.contains(r#"name="colored">"#));
    }

    #[test]
    fn textareas_keep_leading_newlines() {
        let html = render(&PageView {
            script_form: ScriptRequest {
                synopsis: "\nopens on a pier".to_string(),
                ..ScriptRequest::default()
            },
            script: "\nFADE IN.".to_string(),
            ..PageView::default()
        });
        assert!(html.contains("rows=\"12\">\n\nopens on a pier</textarea>"));
        assert!(html.contains("readonly>\n\nFADE IN.</textarea>"));
    }
}
