//! Program renderer.
//!
//! Turns a [`ScheduleDocument`] into LaTeX source for a Japanese `platex`
//! toolchain. Pure string transform: no I/O happens here.

use crate::models::{BreakNode, ProgramMetadata, ScheduleDocument, ScheduleNode, SessionNode};

const SECTION_SEPARATOR: &str = "\n\\vspace{0.5cm}\n";
const RANGE_SEPARATOR: &str = "〜";

/// Escape LaTeX reserved characters in free text.
///
/// Backslash is mapped first, in the same single pass as every other
/// character, so the braces it introduces are never escaped a second time.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' => out.push_str("\\&"),
            '%' => out.push_str("\\%"),
            '$' => out.push_str("\\$"),
            '#' => out.push_str("\\#"),
            '_' => out.push_str("\\_"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            other => out.push(other),
        }
    }
    out
}

fn time_range(start: &str, end: &str) -> String {
    format!(
        "{}{}{}",
        escape_latex(start),
        RANGE_SEPARATOR,
        escape_latex(end)
    )
}

fn render_break(node: &BreakNode) -> String {
    format!(
        "\\section*{{Break({})}}\n\\vspace{{0.5cm}}",
        time_range(&node.start_time, &node.end_time)
    )
}

/// Render one session; returns the markup and the next row number.
fn render_session(node: &SessionNode, session_number: usize, first_row: usize) -> (String, usize) {
    let chair = escape_latex(node.chair.as_deref().unwrap_or_default());
    let timekeeper = escape_latex(node.timekeeper.as_deref().unwrap_or_default());

    let rows: Vec<String> = node
        .presentations
        .iter()
        .enumerate()
        .map(|(offset, p)| {
            format!(
                "  {}. & {} & {} \\\\",
                first_row + offset,
                escape_latex(&p.display_name),
                escape_latex(&p.theme)
            )
        })
        .collect();

    let markup = format!(
        "\n\\section*{{Session {}({}){{\\normalsize 座長:{}、タイムキーパー:{}}} }}\n\
         \\begin{{tabular}}{{rlp{{12cm}}}}\n\
         {}\n\
         \\end{{tabular}}\n",
        session_number,
        time_range(&node.start_time, &node.end_time),
        chair,
        timekeeper,
        rows.join("\n"),
    );

    (markup, first_row + node.presentations.len())
}

/// Section markup for every node, in document order.
///
/// Sessions are numbered from 1 and their rows continue one running
/// sequence across the whole program; breaks consume neither.
pub fn render_sections(nodes: &[ScheduleNode]) -> Vec<String> {
    let (sections, _, _) = nodes.iter().fold(
        (Vec::with_capacity(nodes.len()), 0usize, 1usize),
        |(mut sections, sessions_seen, next_row), node| match node {
            ScheduleNode::Break(b) => {
                sections.push(render_break(b));
                (sections, sessions_seen, next_row)
            }
            ScheduleNode::Session(s) => {
                let (markup, next_row) = render_session(s, sessions_seen + 1, next_row);
                sections.push(markup);
                (sections, sessions_seen + 1, next_row)
            }
        },
    );
    sections
}

fn render_title_block(metadata: &ProgramMetadata) -> String {
    format!(
        "\\title{{{{\\normalsize {}}} \\\\\n\
         {{\\LARGE {}}} \\\\\n\
         {{\\Large {}}}}}\n\
         \\date{{\\empty}}\n\
         \\maketitle\n\
         \\vspace{{-1cm}}\n\
         \\noindent\n\
         \\hspace{{5cm}} 日時:{} \\\\\n\
         \\hspace{{5cm}} 会場:{}\n\
         \\vspace{{1cm}}",
        escape_latex(&metadata.course_name),
        escape_latex(&metadata.event_name),
        escape_latex(&metadata.event_theme),
        escape_latex(&metadata.date_time),
        escape_latex(&metadata.venue),
    )
}

/// Render the complete, self-contained program document.
pub fn render_program(document: &ScheduleDocument) -> String {
    let sections = render_sections(&document.nodes).join(SECTION_SEPARATOR);

    format!(
        "\\documentclass[dvipdfmx,a4j]{{jsarticle}}\n\
         \\usepackage[top=20truemm,bottom=20truemm,left=25truemm,right=25truemm]{{geometry}}\n\
         \\begin{{document}}\n\
         {}\n\
         {}\n\
         \\end{{document}}\n",
        render_title_block(&document.metadata),
        sections,
    )
}
