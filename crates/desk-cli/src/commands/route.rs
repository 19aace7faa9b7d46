//! Route command

use crate::output::{or_dash, Field, OutputFormat};
use crate::RouteArgs;
use colored::Colorize;
use desk_engine::{Assignment, AssignmentSource, CreateTicketCommand, SlaStatus, TicketUseCases, TicketView};
use std::path::Path;

pub fn handle(args: RouteArgs, config_path: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    let engine = super::engine(config_path)?;
    let view = engine.create_ticket(CreateTicketCommand {
        title: args.title,
        description: args.description,
        category: args.category,
        priority: args.priority,
        customer_name: args.name,
        customer_email: args.email,
        agent_id: args.agent,
    })?;

    format.print("Routed ticket", &view, || fields(&view))
}

fn fields(view: &TicketView) -> Vec<Field> {
    let t = &view.ticket;
    vec![
        Field::new("Ticket", &view.display_id),
        Field::new("Title", t.title()),
        Field::new("Priority", t.priority()),
        Field::new("Category", or_dash(t.category())),
        Field::new("Customer", t.customer().email.as_str()),
        Field::new("Status", t.status()),
        Field::new("Assignment", describe(view.assignment.as_ref())),
        Field::new("Response due", t.sla_response_due().format("%Y-%m-%d %H:%M UTC")),
        Field::new("Resolution due", t.sla_resolution_due().format("%Y-%m-%d %H:%M UTC")),
        Field::new("SLA", paint(view.sla_status)),
    ]
}

fn describe(assignment: Option<&Assignment>) -> String {
    match assignment {
        Some(Assignment::Assigned { agent_id, source }) => match source {
            AssignmentSource::Rule { rule_id } => format!("{} (rule {})", agent_id, rule_id),
            AssignmentSource::Fallback => format!("{} (fallback)", agent_id),
            AssignmentSource::Manual => format!("{} (manual)", agent_id),
        },
        Some(Assignment::Unassigned) | None => "unassigned".yellow().to_string(),
    }
}

fn paint(status: SlaStatus) -> String {
    match status {
        SlaStatus::OnTrack => status.as_str().green().to_string(),
        SlaStatus::AtRisk => status.as_str().yellow().to_string(),
        SlaStatus::Breached => status.as_str().red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_engine::{AgentId, RuleId};

    #[test]
    fn test_describe_assignment() {
        colored::control::set_override(false);
        let rule = Assignment::Assigned {
            agent_id: AgentId::new("agent_3").unwrap(),
            source: AssignmentSource::Rule { rule_id: RuleId::new("rule_2").unwrap() },
        };
        assert_eq!(describe(Some(&rule)), "agent_3 (rule rule_2)");
        assert_eq!(describe(Some(&Assignment::Unassigned)), "unassigned");
    }
}
