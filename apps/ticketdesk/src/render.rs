//! Terminal rendering of the views.

use colored::{ColoredString, Colorize};
use helpdesk_client::NavSection;
use helpdesk_client::views::{ReportView, TicketHistoryView, TicketSummary, UserDirectory};
use helpdesk_sdk::{Identity, Role, Ticket, TicketPriority, TicketStatus};

const BAR_WIDTH: usize = 30;
const HISTORY_WIDTH: usize = 72;

pub fn status_badge(status: TicketStatus) -> ColoredString {
    let label = status.label();
    match status {
        TicketStatus::Open => label.yellow(),
        TicketStatus::InProgress => label.blue(),
        TicketStatus::Closed => label.green(),
        TicketStatus::Rejected => label.red(),
    }
}

pub fn priority_badge(priority: TicketPriority) -> ColoredString {
    let label = priority.label();
    match priority {
        TicketPriority::Low => label.normal(),
        TicketPriority::Medium => label.cyan(),
        TicketPriority::High => label.yellow(),
        TicketPriority::Urgent => label.red().bold(),
    }
}

pub fn role_badge(role: Role) -> ColoredString {
    let label = role.label();
    match role {
        Role::Admin => label.magenta(),
        Role::Operator => label.blue(),
        Role::Customer => label.normal(),
    }
}

pub fn notice(text: &str) {
    println!("{}", text.yellow());
}

pub fn inline_error(text: &str) {
    eprintln!("{}", text.red());
}

pub fn identity(me: &Identity) {
    println!(
        "{} <{}> [{}]",
        me.display_name.bold(),
        me.email,
        role_badge(me.role)
    );
}

pub fn navigation(sections: &[NavSection]) {
    for section in sections {
        println!("{}", section.title.bold());
        for entry in &section.entries {
            println!("  {:<16} {}", entry.label, entry.route.to_string().dimmed());
        }
    }
}

pub fn ticket_line(ticket: &Ticket) {
    println!(
        "#{:<6} {:<12} {:<8} {}  {}",
        ticket.id,
        status_badge(ticket.status),
        priority_badge(ticket.priority),
        ticket.created_at.date().to_string().dimmed(),
        ticket.subject
    );
}

pub fn ticket_detail(ticket: &Ticket) {
    ticket_line(ticket);
    if !ticket.description.is_empty() {
        println!("        {}", ticket.description);
    }
}

pub fn tickets(list: &[&Ticket]) {
    for ticket in list {
        ticket_line(ticket);
    }
}

pub fn summary(summary: &TicketSummary) {
    println!("{} {}", "Total:".bold(), summary.total);
    for &(status, count) in &summary.by_status {
        println!("  {:<12} {count}", status_badge(status));
    }
}

/// Bar length for `value` scaled against `max`.
fn bar_len(value: usize, max: usize) -> usize {
    value
        .saturating_mul(BAR_WIDTH)
        .checked_div(max)
        .unwrap_or(0)
}

fn percent(share: f64) -> String {
    format!("{:.0}%", share * 100.0)
}

pub fn report(report: &ReportView) {
    if let Some(text) = &report.notice {
        notice(text);
    }
    summary(&report.summary);

    println!();
    println!("{}", "Por estado".bold());
    let max = report.chart.iter().map(|s| s.value).max().unwrap_or(0);
    for slice in &report.chart {
        println!(
            "  {:<12} {:<width$} {:>3} {}",
            slice.label,
            "\u{2588}".repeat(bar_len(slice.value, max)),
            slice.value,
            percent(slice.share).dimmed(),
            width = BAR_WIDTH
        );
    }

    println!();
    println!("{}", "Por prioridad".bold());
    for &(priority, count) in &report.by_priority {
        println!("  {:<12} {count}", priority_badge(priority));
    }
}

pub fn history(view: &TicketHistoryView) {
    println!("{} #{}", "Historial".bold(), view.ticket_id);
    if let Some(text) = &view.notice {
        notice(text);
    }
    if view.is_empty() && view.notice.is_none() {
        println!("{}", "Sin interacciones.".dimmed());
    }
    for entry in &view.entries {
        let i = &entry.interaction;
        let header = format!("{} \u{b7} {}", i.author.label(), i.created_at.date());
        if entry.align_right {
            println!("{:>w$}", header.dimmed(), w = HISTORY_WIDTH);
            println!("{:>w$}", i.message.cyan(), w = HISTORY_WIDTH);
        } else {
            println!("{}", header.dimmed());
            println!("{}", i.message);
        }
    }
}

pub fn users(directory: &UserDirectory) {
    if let Some(text) = directory.notice() {
        notice(text);
    }
    println!(
        "{} {}  ({} {}, {} {}, {} {})",
        "Usuarios:".bold(),
        directory.total(),
        Role::Admin.label(),
        directory.count(Role::Admin),
        Role::Operator.label(),
        directory.count(Role::Operator),
        Role::Customer.label(),
        directory.count(Role::Customer),
    );
    for user in directory.users() {
        let state = if user.active {
            "activo".green()
        } else {
            "inactivo".red()
        };
        println!(
            "{:>5}  {:<24} {:<28} {:<10} {}",
            user.id,
            user.display_name,
            user.email,
            role_badge(user.role),
            state
        );
    }
}
