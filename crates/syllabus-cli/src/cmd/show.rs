//! `syl show`: the whole course tree with checkbox states.

use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use syllabus_core::session::SessionError;
use syllabus_core::view::{CheckState, NodeView};
use syllabus_core::{EngineError, NodeId, ProgressSummary};

use super::{Context, glyph_line, write_summary_pretty, write_summary_text};
use crate::output::{pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Show only this topic and its subtopics.
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ShowOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    course: Option<String>,
    topics: Vec<NodeView>,
    summary: ProgressSummary,
}

pub fn run_show(args: &ShowArgs, ctx: &Context) -> Result<()> {
    let session = ctx.open_session()?;
    let tree = session.engine().tree();

    let topics = match &args.id {
        Some(id) => {
            let Some(node) = tree.find(id.trim()) else {
                let err = EngineError::NotFound {
                    id: NodeId::new_unchecked(id.trim()),
                };
                return Err(ctx.fail(&SessionError::Engine(err)));
            };
            vec![NodeView::of(node)]
        }
        None => tree.topics().iter().map(NodeView::of).collect(),
    };

    let report = ShowOutput {
        course: session.course_title().map(str::to_string),
        topics,
        summary: session.summary(),
    };
    let bar_width = ctx.project.display.bar_width;
    render_mode(
        ctx.output,
        &report,
        |r, w| {
            for topic in &r.topics {
                write_text(topic, 0, w)?;
            }
            write_summary_text(&r.summary, w)
        },
        |r, w| {
            pretty_section(w, r.course.as_deref().unwrap_or("Syllabus"))?;
            if r.topics.is_empty() {
                writeln!(w, "(no topics yet)")?;
            }
            for topic in &r.topics {
                write_pretty(topic, 0, w)?;
            }
            writeln!(w)?;
            write_summary_pretty(&r.summary, bar_width, w)
        },
    )
}

fn write_text(node: &NodeView, depth: usize, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "{depth}\t{}\t{}\t{}",
        node.id,
        state_name(node.state),
        node.title
    )?;
    for child in &node.subtopics {
        write_text(child, depth + 1, w)?;
    }
    Ok(())
}

fn write_pretty(node: &NodeView, depth: usize, w: &mut dyn Write) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    write!(w, "{indent}{}", glyph_line(node.state, &node.id, &node.title))?;
    if let Some(date) = node.scheduled_date {
        write!(w, "  [{date}]")?;
    }
    writeln!(w)?;
    for child in &node.subtopics {
        write_pretty(child, depth + 1, w)?;
    }
    Ok(())
}

const fn state_name(state: CheckState) -> &'static str {
    match state {
        CheckState::Checked => "checked",
        CheckState::Unchecked => "unchecked",
        CheckState::Indeterminate => "indeterminate",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> NodeView {
        NodeView {
            id: "t1".into(),
            title: "Basics".into(),
            description: None,
            scheduled_date: None,
            completed: false,
            state: CheckState::Indeterminate,
            subtopics: vec![NodeView {
                id: "t1.a".into(),
                title: "Variables".into(),
                description: None,
                scheduled_date: None,
                completed: true,
                state: CheckState::Checked,
                subtopics: Vec::new(),
            }],
        }
    }

    #[test]
    fn text_rows_carry_depth_and_state() {
        let mut buf = Vec::new();
        write_text(&view(), 0, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            text,
            "0\tt1\tindeterminate\tBasics\n1\tt1.a\tchecked\tVariables\n"
        );
    }

    #[test]
    fn pretty_rows_are_indented() {
        let mut buf = Vec::new();
        write_pretty(&view(), 0, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("[-] Basics (t1)\n"));
        assert!(text.contains("  [x] Variables (t1.a)"));
    }
}
