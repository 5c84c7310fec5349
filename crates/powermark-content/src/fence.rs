//! Routing of fenced code blocks by label.
//!
//! | Label (default) | Handling |
//! |---|---|
//! | `python-power` | executed in the sandbox; output wrapped in `<div class="python-power-output">` |
//! | `css-power` | collected into the environment's style category; renders nothing |
//! | `js-power` | emitted verbatim inside `<script>` without being executed |
//! | anything else | rendered as an ordinary code block |

use log::debug;
use powermark_core::escape_attr;
use powermark_exec::Sandbox;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd, html};
use serde::{Deserialize, Serialize};

use crate::environment::{RenderEnvironment, STYLE_CATEGORY};

/// Labels the router recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FenceLabels {
    /// Fences whose body is executed.
    pub exec_label: String,
    /// Fences whose body is collected as page styles.
    pub style_label: String,
    /// Fences whose body is emitted as a script.
    pub script_label: String,
}

impl Default for FenceLabels {
    fn default() -> Self {
        Self {
            exec_label: "python-power".to_string(),
            style_label: "css-power".to_string(),
            script_label: "js-power".to_string(),
        }
    }
}

/// How a fence is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    /// Run and embed the output.
    Execute,
    /// Collect into the environment.
    Style,
    /// Emit as a script element.
    Script,
    /// Ordinary code block.
    Plain,
}

/// Dispatches fenced blocks to their handlers.
#[derive(Debug, Clone)]
pub struct FenceRouter {
    labels: FenceLabels,
    sandbox: Sandbox,
}

impl FenceRouter {
    /// A router using `sandbox` for executable fences.
    pub fn new(labels: FenceLabels, sandbox: Sandbox) -> Self {
        Self { labels, sandbox }
    }

    /// Recognized labels.
    pub fn labels(&self) -> &FenceLabels {
        &self.labels
    }

    /// Classify a fence by the first word of its info string.
    pub fn classify(&self, info: &str) -> FenceKind {
        let label = fence_label(info);
        if label.is_empty() {
            FenceKind::Plain
        } else if label == self.labels.exec_label {
            FenceKind::Execute
        } else if label == self.labels.style_label {
            FenceKind::Style
        } else if label == self.labels.script_label {
            FenceKind::Script
        } else {
            FenceKind::Plain
        }
    }

    /// Render one fence. Never fails; unknown labels render as code.
    pub fn dispatch(&self, info: &str, content: &str, env: &mut RenderEnvironment) -> String {
        let kind = self.classify(info);
        debug!("dispatching fence `{}` as {kind:?}", fence_label(info));
        match kind {
            FenceKind::Execute => {
                let output = self.sandbox.execute(content);
                format!(
                    "<div class=\"{}-output\">{output}</div>\n",
                    escape_attr(&self.labels.exec_label)
                )
            }
            FenceKind::Style => {
                env.push(STYLE_CATEGORY, content);
                String::new()
            }
            FenceKind::Script => format!("<script>\n{content}</script>\n"),
            FenceKind::Plain => render_code_block(info, content),
        }
    }
}

/// The label of a fence: the first word of its info string.
pub fn fence_label(info: &str) -> &str {
    info.split_whitespace().next().unwrap_or("")
}

/// Render a fence the way the markdown renderer would by default.
pub fn render_code_block(info: &str, content: &str) -> String {
    let events = [
        Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(CowStr::from(info)))),
        Event::Text(CowStr::from(content)),
        Event::End(TagEnd::CodeBlock),
    ];
    let mut out = String::with_capacity(content.len() + 32);
    html::push_html(&mut out, events.into_iter());
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use powermark_exec::MockExecutor;

    fn router(executor: MockExecutor) -> FenceRouter {
        FenceRouter::new(FenceLabels::default(), Sandbox::new(executor))
    }

    #[test]
    fn test_classify_by_first_word() {
        let router = router(MockExecutor::with_output(""));
        assert_eq!(router.classify("python-power"), FenceKind::Execute);
        assert_eq!(router.classify("  css-power extra"), FenceKind::Style);
        assert_eq!(router.classify("js-power"), FenceKind::Script);
        assert_eq!(router.classify("rust"), FenceKind::Plain);
        assert_eq!(router.classify(""), FenceKind::Plain);
    }

    #[test]
    fn test_execute_fence_wraps_output() {
        let executor = MockExecutor::with_output("42\n");
        let router = router(executor.clone());
        let mut env = RenderEnvironment::new();
        let html = router.dispatch("python-power", "print(42)\n", &mut env);
        assert_eq!(html, "<div class=\"python-power-output\">42\n</div>\n");
        assert_eq!(executor.calls(), vec!["print(42)\n"]);
        assert!(env.is_empty());
    }

    #[test]
    fn test_execute_failure_is_contained() {
        let router = router(MockExecutor::failing("NameError: name 'x' is not defined"));
        let html = router.dispatch("python-power", "x", &mut RenderEnvironment::new());
        assert!(html.starts_with("<div class=\"python-power-output\">Error executing code:"));
        assert!(html.contains("<pre>NameError: name 'x' is not defined</pre>"));
    }

    #[test]
    fn test_style_fence_collects_and_renders_nothing() {
        let router = router(MockExecutor::with_output(""));
        let mut env = RenderEnvironment::new();
        assert_eq!(router.dispatch("css-power", "h1 { color: red; }\n", &mut env), "");
        assert_eq!(router.dispatch("css-power", "p {}\n", &mut env), "");
        assert_eq!(env.styles(), ["h1 { color: red; }\n", "p {}\n"]);
    }

    #[test]
    fn test_script_fence_is_verbatim_and_not_executed() {
        let executor = MockExecutor::with_output("should not run");
        let router = router(executor.clone());
        let mut env = RenderEnvironment::new();
        let html = router.dispatch("js-power", "if (a < b) { go(); }\n", &mut env);
        assert_eq!(html, "<script>\nif (a < b) { go(); }\n</script>\n");
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn test_unknown_label_renders_code_block() {
        let router = router(MockExecutor::with_output(""));
        let html = router.dispatch("rust", "let x = 1 < 2;\n", &mut RenderEnvironment::new());
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\">let x = 1 &lt; 2;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_custom_labels() {
        let labels = FenceLabels {
            exec_label: "run".into(),
            ..FenceLabels::default()
        };
        let router = FenceRouter::new(labels, Sandbox::new(MockExecutor::with_output("ok")));
        assert_eq!(
            router.dispatch("run", "", &mut RenderEnvironment::new()),
            "<div class=\"run-output\">ok</div>\n"
        );
        assert_eq!(router.classify("python-power"), FenceKind::Plain);
    }
}
