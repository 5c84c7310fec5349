//! The compile pipeline.
//!
//! ```text
//! raw text ─▶ front matter ─▶ literalHTML expansion ─▶ markdown + fences
//!          ─▶ attribute annotation ─▶ page shell ─▶ HTML page
//! ```
//!
//! Each compile gets a fresh [`RenderEnvironment`], so a [`Compiler`] can be
//! reused for any number of documents.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use powermark_core::{Error, ResourceKind, Result, default_output_path};
use powermark_exec::Sandbox;

use crate::assemble::{PageParts, PageShell};
use crate::attributes::{AnnotationReport, Annotator, MergePolicy};
use crate::environment::RenderEnvironment;
use crate::fence::{FenceLabels, FenceRouter};
use crate::frontmatter::{Metadata, parse_document};
use crate::inline::expand_literal_html;
use crate::markdown::{MarkdownOptions, render_markdown};

/// Knobs for a [`Compiler`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Fence labels to route on.
    pub labels: FenceLabels,
    /// Markdown extensions.
    pub markdown: MarkdownOptions,
    /// How attribute blocks merge with existing attributes.
    pub merge_policy: MergePolicy,
}

/// One compiled document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Front matter of the source document.
    pub metadata: Metadata,
    /// Annotated body fragment.
    pub fragment: String,
    /// Style fragments collected from style fences.
    pub styles: Vec<String>,
    /// Complete page.
    pub html: String,
    /// What the annotation pass did.
    pub annotations: AnnotationReport,
}

/// Turns documents into pages.
#[derive(Debug, Clone)]
pub struct Compiler {
    router: FenceRouter,
    markdown: MarkdownOptions,
    annotator: Annotator,
    shell: PageShell,
}

impl Compiler {
    /// A compiler with default options and the built-in shell.
    pub fn new(sandbox: Sandbox) -> Self {
        Self::with_options(sandbox, CompileOptions::default())
    }

    /// A compiler with the given options and the built-in shell.
    pub fn with_options(sandbox: Sandbox, options: CompileOptions) -> Self {
        Self {
            router: FenceRouter::new(options.labels, sandbox),
            markdown: options.markdown,
            annotator: Annotator::new(options.merge_policy),
            shell: PageShell::builtin(),
        }
    }

    /// Use `shell` instead of the built-in one.
    pub fn with_shell(mut self, shell: PageShell) -> Self {
        self.shell = shell;
        self
    }

    /// Compile document text.
    pub fn compile(&self, raw: &str) -> Result<Page> {
        let document = parse_document(raw)?;
        let body = expand_literal_html(&document.body);

        let mut env = RenderEnvironment::new();
        let rendered = render_markdown(&body, &self.markdown, &self.router, &mut env);
        let (fragment, annotations) = self.annotator.annotate_with_report(&rendered);
        if !annotations.dangling.is_empty() {
            debug!(
                "{} attribute blocks had no tag to attach to",
                annotations.dangling.len()
            );
        }

        let html = self.shell.render(&PageParts {
            title: document.metadata.title_or_default(),
            css: &document.metadata.css,
            styles: env.styles(),
            body: &fragment,
            js: &document.metadata.js,
        });
        let styles = env.styles().to_vec();

        Ok(Page {
            metadata: document.metadata,
            fragment,
            styles,
            html,
            annotations,
        })
    }

    /// Compile `input` and write the page.
    ///
    /// Without an explicit `output`, the page is written next to the input
    /// with its extension replaced by `.html`. Returns the path written.
    pub fn compile_file(&self, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        let raw = fs::read_to_string(input)
            .map_err(|e| Error::io_for(ResourceKind::Document, e, input))?;
        let page = self.compile(&raw)?;

        let output = output.map_or_else(|| default_output_path(input), Path::to_path_buf);
        fs::write(&output, &page.html).map_err(|e| Error::io_with_path(e, &output))?;

        info!(
            "compiled {} to {} ({} bytes)",
            input.display(),
            output.display(),
            page.html.len()
        );
        Ok(output)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use powermark_exec::MockExecutor;
    use tempfile::TempDir;

    fn compiler(executor: MockExecutor) -> Compiler {
        Compiler::new(Sandbox::new(executor))
    }

    fn bare_shell() -> PageShell {
        PageShell::parse("[$title]$css_links|<style>$custom_styles</style>|$html_content|$js_links")
            .unwrap()
    }

    // ------------------------------------------------------------------------
    // compile
    // ------------------------------------------------------------------------

    #[test]
    fn test_compile_full_document() {
        let raw = "---\ntitle: Demo\ncss: site.css\njs: [app.js]\n---\n\
                   ## Intro {#intro .lead}\n\n\
                   ```css-power\nh2 { color: red; }\n```\n\n\
                   Value: literalHTML[<kbd>[x]</kbd>]\n";
        let page = compiler(MockExecutor::with_output(""))
            .with_shell(bare_shell())
            .compile(raw)
            .unwrap();

        assert_eq!(page.metadata.title.as_deref(), Some("Demo"));
        assert_eq!(page.styles, vec!["h2 { color: red; }\n"]);
        assert!(page.fragment.contains(r#"<h2 id="intro" class="lead">Intro </h2>"#));
        assert!(page.fragment.contains("<p>Value: <kbd>[x]</kbd></p>"));
        assert!(page.html.starts_with(
            "[Demo]<link rel=\"stylesheet\" href=\"site.css\">|<style>h2 { color: red; }\n</style>|"
        ));
        assert!(page.html.ends_with("|<script src=\"app.js\"></script>"));
        assert_eq!(page.annotations.anchored, 1);
    }

    #[test]
    fn test_compile_paragraph_attribute() {
        let page = compiler(MockExecutor::with_output(""))
            .compile("Hello {.greeting}\n")
            .unwrap();
        assert_eq!(page.fragment, "<p class=\"greeting\">Hello </p>\n");
    }

    #[test]
    fn test_attribute_values_keep_plain_quotes() {
        let page = compiler(MockExecutor::with_output(""))
            .compile("Text {alt='don't'}\n")
            .unwrap();
        assert_eq!(page.fragment, "<p alt=\"don't\">Text </p>\n");
    }

    #[test]
    fn test_failing_fence_leaves_rest_of_document() {
        let raw = "Before\n\n```python-power\n1/0\n```\n\nAfter\n";
        let page = compiler(MockExecutor::failing("ZeroDivisionError: division by zero"))
            .compile(raw)
            .unwrap();
        assert!(page.fragment.starts_with("<p>Before</p>\n"));
        assert!(page.fragment.contains(
            "<div class=\"python-power-output\">Error executing code:\n<pre>ZeroDivisionError: division by zero</pre></div>"
        ));
        assert!(page.fragment.ends_with("<p>After</p>\n"));
    }

    #[cfg(unix)]
    #[test]
    fn test_timed_out_fence_leaves_rest_of_document() {
        use powermark_exec::ProcessExecutor;
        use std::time::Duration;

        let executor = ProcessExecutor::new("sh").with_timeout(Duration::from_millis(200));
        let raw = "Before\n\n```python-power\nsleep 5\n```\n\nAfter\n";
        let page = Compiler::new(Sandbox::new(executor)).compile(raw).unwrap();
        assert!(page.fragment.starts_with("<p>Before</p>\n"));
        assert!(page.fragment.contains("Error executing code:\n<pre>execution timed out"));
        assert!(page.fragment.ends_with("<p>After</p>\n"));
    }

    #[test]
    fn test_executed_output_is_embedded() {
        let executor = MockExecutor::with_output("<b>42</b>\n");
        let page = compiler(executor.clone())
            .compile("```python-power\nprint('<b>42</b>')\n```\n")
            .unwrap();
        assert_eq!(
            page.fragment,
            "<div class=\"python-power-output\"><b>42</b>\n</div>\n"
        );
        assert_eq!(executor.calls(), vec!["print('<b>42</b>')\n"]);
    }

    #[test]
    fn test_default_title() {
        let page = compiler(MockExecutor::with_output(""))
            .with_shell(bare_shell())
            .compile("body")
            .unwrap();
        assert!(page.html.starts_with("[Rendered Page]"));
    }

    #[test]
    fn test_environment_is_fresh_per_compile() {
        let compiler = compiler(MockExecutor::with_output(""));
        let first = compiler.compile("```css-power\na {}\n```\n").unwrap();
        let second = compiler.compile("plain\n").unwrap();
        assert_eq!(first.styles.len(), 1);
        assert!(second.styles.is_empty());
    }

    #[test]
    fn test_append_policy_option() {
        let options = CompileOptions {
            merge_policy: MergePolicy::Append,
            ..CompileOptions::default()
        };
        let compiler = Compiler::with_options(Sandbox::new(MockExecutor::with_output("")), options);
        let page = compiler.compile("literalHTML[<h3 id=\"a\">T</h3>]{#b}\n").unwrap();
        assert!(page.fragment.contains(r#"<h3 id="a" id="b">T</h3>"#));
    }

    #[test]
    fn test_malformed_front_matter_is_error() {
        let err = compiler(MockExecutor::with_output(""))
            .compile("---\ncss: [oops\n---\n")
            .unwrap_err();
        assert!(matches!(err, Error::FrontMatter(_)));
    }

    // ------------------------------------------------------------------------
    // compile_file
    // ------------------------------------------------------------------------

    #[test]
    fn test_compile_file_default_output_path() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("post.md");
        fs::write(&input, "# Hello\n").unwrap();

        let written = compiler(MockExecutor::with_output(""))
            .compile_file(&input, None)
            .unwrap();
        assert_eq!(written, dir.path().join("post.html"));
        let html = fs::read_to_string(&written).unwrap();
        assert!(html.contains("<h1>Hello</h1>"));
    }

    #[test]
    fn test_compile_file_explicit_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("post.md");
        let output = dir.path().join("out.html");
        fs::write(&input, "text\n").unwrap();

        let written = compiler(MockExecutor::with_output(""))
            .compile_file(&input, Some(&output))
            .unwrap();
        assert_eq!(written, output);
        assert!(output.exists());
    }

    #[test]
    fn test_compile_file_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = compiler(MockExecutor::with_output(""))
            .compile_file(&dir.path().join("absent.md"), None)
            .unwrap_err();
        assert!(err.is_missing_resource());
        assert!(err.to_string().contains("input document"));
    }
}
