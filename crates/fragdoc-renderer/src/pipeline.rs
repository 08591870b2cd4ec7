//! Line pipeline: classify, extract title, paginate, rewrite.

use std::borrow::Cow;
use std::ops::ControlFlow;

use crate::heading::classify;
use crate::links::{LinkRewriter, directory_prefix};
use crate::paginator::{LineAction, PaginationMode, Paginator, PaginatorConfig};
use crate::title::TitleExtractor;

/// Per-render inputs.
#[derive(Debug, Clone, Copy)]
pub struct PipelineRequest<'r> {
    /// Target identifier, already validated (e.g. `"sapi/doc/index.html"`).
    pub target: &'r str,
    /// Windowing behavior.
    pub mode: PaginationMode,
    /// About fragment, emitted verbatim before the content in summary mode.
    pub about: Option<&'r str>,
    /// Title used when the fragment has no `<h1>` or `<h2>`.
    pub default_title: &'r str,
}

/// Result of rendering one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    /// Emitted lines, in order.
    pub lines: Vec<String>,
    /// Page title.
    pub title: String,
    /// Section boundaries seen before the scan ended.
    pub sections: usize,
    /// Whether the summary window cut the scan short.
    pub truncated: bool,
    /// Number of fragment lines read.
    pub lines_read: usize,
}

/// Mutable state for a single render.
#[derive(Debug)]
pub struct RenderContext<'r> {
    prefix: &'r str,
    title: TitleExtractor,
    paginator: Paginator<'r>,
}

impl<'r> RenderContext<'r> {
    /// Start a render of `request.target`.
    #[must_use]
    pub fn new(
        request: &PipelineRequest<'r>,
        pagination: &'r PaginatorConfig,
        controller: &'r str,
    ) -> Self {
        Self {
            prefix: directory_prefix(request.target),
            title: TitleExtractor::new(),
            paginator: Paginator::new(request.mode, pagination, controller, request.target),
        }
    }

    /// Directory prefix applied to relative links.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.prefix
    }

    /// Title captured so far.
    #[must_use]
    pub fn title(&self) -> &TitleExtractor {
        &self.title
    }

    /// Pagination state.
    #[must_use]
    pub fn paginator(&self) -> &Paginator<'r> {
        &self.paginator
    }

    /// Process one fragment line, pushing emitted lines onto `out`.
    ///
    /// Returns `Break` once no further lines should be read.
    pub fn step(
        &mut self,
        line: &str,
        rewriter: &LinkRewriter,
        out: &mut Vec<String>,
    ) -> ControlFlow<()> {
        let heading = classify(line);
        self.title.observe(heading.as_ref());

        match self.paginator.feed(line, heading.as_ref()) {
            LineAction::Skip => {}
            LineAction::Emit(content) => out.push(self.rewrite(rewriter, content)),
            LineAction::Preface { generated, line } => {
                out.push(generated);
                out.push(self.rewrite(rewriter, line));
            }
            LineAction::Truncate(generated) => {
                out.push(generated);
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn rewrite(&self, rewriter: &LinkRewriter, line: Cow<'_, str>) -> String {
        match rewriter.rewrite(&line, self.prefix) {
            Cow::Owned(rewritten) => rewritten,
            Cow::Borrowed(_) => line.into_owned(),
        }
    }

    /// Finish the render, appending any trailing line.
    #[must_use]
    pub fn finish(self, default_title: &str, mut lines: Vec<String>, lines_read: usize) -> RenderOutput {
        lines.extend(self.paginator.finish());
        RenderOutput {
            lines,
            sections: self.paginator.section_count(),
            truncated: self.paginator.is_finished(),
            title: self.title.finish(default_title),
            lines_read,
        }
    }
}

/// Renders fragments with a fixed rewriter and pagination configuration.
#[derive(Debug, Clone)]
pub struct FragmentPipeline {
    rewriter: LinkRewriter,
    pagination: PaginatorConfig,
}

impl FragmentPipeline {
    /// Create a pipeline.
    #[must_use]
    pub fn new(rewriter: LinkRewriter, pagination: PaginatorConfig) -> Self {
        Self {
            rewriter,
            pagination,
        }
    }

    /// Link rewriter in use.
    #[must_use]
    pub fn rewriter(&self) -> &LinkRewriter {
        &self.rewriter
    }

    /// Pagination settings in use.
    #[must_use]
    pub fn pagination(&self) -> &PaginatorConfig {
        &self.pagination
    }

    /// Render a fragment's lines.
    ///
    /// Lines are pulled lazily; once the summary window is exceeded the
    /// iterator is not advanced any further.
    pub fn render<'a, I>(&self, request: &PipelineRequest<'_>, lines: I) -> RenderOutput
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ctx = RenderContext::new(request, &self.pagination, self.rewriter.controller());
        let mut out = Vec::new();

        if request.mode.prepends_about()
            && let Some(about) = request.about
        {
            out.extend(about.lines().map(str::to_owned));
        }

        let mut lines_read = 0;
        let _ = lines.into_iter().try_for_each(|line| {
            lines_read += 1;
            ctx.step(line, &self.rewriter, &mut out)
        });

        let output = ctx.finish(request.default_title, out, lines_read);
        tracing::debug!(
            fragment = %request.target,
            mode = request.mode.as_str(),
            lines_read = output.lines_read,
            sections = output.sections,
            truncated = output.truncated,
            "Rendered fragment"
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::heading::{HeadingLevel, classify};

    fn pipeline() -> FragmentPipeline {
        FragmentPipeline::new(LinkRewriter::new("index.php"), PaginatorConfig::default())
    }

    fn request(target: &str, mode: PaginationMode) -> PipelineRequest<'_> {
        PipelineRequest {
            target,
            mode,
            about: None,
            default_title: "Default",
        }
    }

    const SUMMARY: PaginationMode = PaginationMode::Summary {
        relabel_first_h2: false,
    };
    const DRILL: PaginationMode = PaginationMode::DrillDown {
        archive_heading: false,
    };

    fn news(sections: usize) -> Vec<String> {
        let mut lines = vec!["<h2>History</h2>".to_owned(), "<p>preamble</p>".to_owned()];
        for i in 1..=sections {
            lines.push(format!("<h3>S{i}</h3>"));
            lines.push(format!("<p>body {i}</p>"));
        }
        lines
    }

    fn sections_in(lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|l| classify(l).filter(|h| h.level == HeadingLevel::H3))
            .map(|h| h.plain_text())
            .collect()
    }

    #[test]
    fn test_plain_render_rewrites_links_and_extracts_title() {
        let lines = [
            "<h1>Julius</h1>",
            r#"<a href="next.html">n</a> <img src="i.png">"#,
            r#"<a href="http://example.com/x.html">x</a>"#,
        ];

        let output = pipeline().render(&request("doc/a.html", PaginationMode::Plain), lines);

        assert_eq!(output.title, "Julius");
        assert_eq!(
            output.lines,
            vec![
                "<h1>Julius</h1>".to_owned(),
                r#"<a href="index.php?q=doc/next.html">n</a> <img src="doc/i.png">"#.to_owned(),
                r#"<a href="http://example.com/x.html">x</a>"#.to_owned(),
            ]
        );
        assert!(!output.truncated);
        assert_eq!(output.lines_read, 3);
    }

    #[test]
    fn test_default_title_when_no_heading() {
        let output = pipeline().render(&request("a.html", PaginationMode::Plain), ["<p>x</p>"]);

        assert_eq!(output.title, "Default");
    }

    #[test]
    fn test_summary_six_sections() {
        let lines = news(6);

        let output = pipeline().render(
            &request("history.html", SUMMARY),
            lines.iter().map(String::as_str),
        );

        assert_eq!(sections_in(&output.lines), vec!["S1 New!", "S2", "S3", "S4"]);
        assert!(output.truncated);
        assert_eq!(
            output.lines.last().map(String::as_str),
            Some(r#"<hr><p><a href="index.php?q=history.html&amp;m=history">-&gt; Past entries</a></p>"#)
        );
        assert_eq!(
            output
                .lines
                .iter()
                .filter(|l| l.contains("m=history"))
                .count(),
            1
        );
    }

    #[test]
    fn test_summary_within_window_has_no_more_link() {
        let lines = news(4);

        let output = pipeline().render(
            &request("history.html", SUMMARY),
            lines.iter().map(String::as_str),
        );

        assert!(!output.truncated);
        assert_eq!(output.sections, 4);
        assert!(output.lines.iter().all(|l| !l.contains("m=history")));
    }

    #[test]
    fn test_summary_stops_reading_after_window() {
        let lines = news(10);
        let pulled = Cell::new(0);

        let output = pipeline().render(
            &request("history.html", SUMMARY),
            lines.iter().map(String::as_str).inspect(|_| pulled.set(pulled.get() + 1)),
        );

        // preamble (2) + four sections (8) + the fifth heading
        assert_eq!(pulled.get(), 11);
        assert_eq!(output.lines_read, 11);
        assert!(output.lines.iter().all(|l| !l.contains("S5")));
    }

    #[test]
    fn test_summary_prepends_about_verbatim() {
        let about = "<p><a href=\"whatisjulius.html\">About</a></p>";
        let req = PipelineRequest {
            about: Some(about),
            ..request("history.html", SUMMARY)
        };

        let output = pipeline().render(&req, ["<h3>S1</h3>"]);

        assert_eq!(output.lines[0], about);
    }

    #[test]
    fn test_about_ignored_outside_summary() {
        let req = PipelineRequest {
            about: Some("<p>about</p>"),
            ..request("history.html", DRILL)
        };

        let output = pipeline().render(&req, ["<h3>S1</h3>"]);

        assert!(output.lines.iter().all(|l| l != "<p>about</p>"));
    }

    #[test]
    fn test_drilldown_example() {
        let lines = ["<p>intro</p>", "<h3>S1</h3>", "body1", "<h3>S2</h3>", "body2"];

        let output = pipeline().render(&request("history.html", DRILL), lines);

        assert_eq!(
            output.lines,
            vec![
                "<h3>S1</h3>".to_owned(),
                "body1".to_owned(),
                "<h3>S2</h3>".to_owned(),
                "body2".to_owned(),
                r#"<hr><p><a href="index.php?q=history.html">&lt;- Back</a></p>"#.to_owned(),
            ]
        );
    }

    #[test]
    fn test_drilldown_title_sees_suppressed_preamble() {
        let lines = ["<h1>Julius History</h1>", "<h3>S1</h3>"];

        let output = pipeline().render(&request("history.html", DRILL), lines);

        assert_eq!(output.title, "Julius History");
        assert!(output.lines.iter().all(|l| !l.contains("<h1>")));
    }

    #[test]
    fn test_summary_and_drilldown_cover_all_sections() {
        let lines = news(7);
        let pipeline = pipeline();

        let summary = pipeline.render(
            &request("history.html", SUMMARY),
            lines.iter().map(String::as_str),
        );
        let drill = pipeline.render(
            &request("history.html", DRILL),
            lines.iter().map(String::as_str),
        );

        let summary_sections: Vec<String> = sections_in(&summary.lines)
            .into_iter()
            .map(|s| s.trim_end_matches(" New!").to_owned())
            .collect();
        let drill_sections = sections_in(&drill.lines);
        let all: Vec<String> = (1..=7).map(|i| format!("S{i}")).collect();

        assert_eq!(drill_sections, all);
        assert_eq!(summary_sections, all[..4].to_vec());
    }

    #[test]
    fn test_generated_lines_are_not_rewritten() {
        let rewriter = LinkRewriter::new("index.php");
        let pagination = PaginatorConfig {
            window: 1,
            ..PaginatorConfig::default()
        };
        let pipeline = FragmentPipeline::new(rewriter, pagination);

        let output = pipeline.render(
            &request("sub/history.html", SUMMARY),
            ["<h3>S1</h3>", "<h3>S2</h3>"],
        );

        assert_eq!(
            output.lines.last().map(String::as_str),
            Some(r#"<hr><p><a href="index.php?q=sub/history.html&amp;m=history">-&gt; Past entries</a></p>"#)
        );
    }

    #[test]
    fn test_excluded_lines_pass_through() {
        let rewriter = LinkRewriter::new("index.php")
            .with_exclusions(["php"])
            .unwrap();
        let pipeline = FragmentPipeline::new(rewriter, PaginatorConfig::default());
        let line = r#"<a href="index.php?q=x.html">x</a>"#;

        let output = pipeline.render(&request("doc/a.html", PaginationMode::Plain), [line]);

        assert_eq!(output.lines, vec![line.to_owned()]);
    }
}
