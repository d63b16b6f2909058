use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use anyhow::{Context, Result};
use roamport_core::ProfileDescriptor;
use roamport_migrator::{ApplyOutcome, MigrationReport, SkipReason};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    resolve_output_style(std::io::stdout().is_terminal())
}

pub(crate) fn resolve_output_style(stdout_is_tty: bool) -> OutputStyle {
    if stdout_is_tty {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("[{}] {message}", status.to_ascii_uppercase()),
    }
}

pub(crate) fn render_report_lines(style: OutputStyle, report: &MigrationReport) -> Vec<String> {
    let mut lines = Vec::new();
    match report.skipped {
        Some(SkipReason::MarkerPresent) => {
            lines.push(render_status_line(
                style,
                "skip",
                "profile already migrated (import marker present; use --force to rerun)",
            ));
            return paint(style, lines);
        }
        Some(SkipReason::AlreadyMigrated) => {
            lines.push(render_status_line(
                style,
                "skip",
                "no legacy profile store found; nothing to migrate",
            ));
            return paint(style, lines);
        }
        None => {}
    }

    if let Some(descriptor) = &report.descriptor {
        lines.push(render_status_line(
            style,
            "ok",
            &format!("migrated {} profile", descriptor.profile_type.as_str()),
        ));
    }
    lines.push(render_status_line(
        style,
        "ok",
        &format!(
            "data: {} directories created, {} files copied",
            report.copy.directories_created, report.copy.files_copied
        ),
    ));
    let settings = match report.settings {
        Some(ApplyOutcome::Imported) => "settings: imported",
        Some(ApplyOutcome::NoSettings) | None => "settings: nothing to import",
    };
    lines.push(render_status_line(style, "ok", settings));
    paint(style, lines)
}

pub(crate) fn render_passthru(descriptor: &ProfileDescriptor) -> Result<String> {
    serde_json::to_string_pretty(descriptor).context("failed to serialize profile descriptor")
}

fn paint(style: OutputStyle, lines: Vec<String>) -> Vec<String> {
    if style == OutputStyle::Plain {
        return lines;
    }
    lines
        .into_iter()
        .map(|line| match line.split_once(' ') {
            Some((badge, rest)) if badge.starts_with('[') => {
                format!("{} {rest}", colorize(badge_style(badge), badge))
            }
            _ => line,
        })
        .collect()
}

fn badge_style(badge: &str) -> Style {
    let color = if badge.starts_with("[OK") {
        AnsiColor::BrightGreen
    } else {
        AnsiColor::BrightYellow
    };
    Style::new().fg_color(Some(color.into())).effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
