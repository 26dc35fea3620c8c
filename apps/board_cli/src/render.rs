//! Plain-text rendering of listings, applicants and notices.

use client_core::{profile_path, ApplicantActions, Notice, NoticeLevel};
use shared::{
    domain::ProposalTab,
    protocol::{Applicant, Proposal},
};

pub fn proposal_line(proposal: &Proposal) -> String {
    let skills: Vec<&str> = proposal.skill_labels().collect();
    let skills = if skills.is_empty() {
        String::new()
    } else {
        format!(" [{}]", skills.join(", "))
    };
    format!(
        "{id}  {title}{skills}  deadline {deadline}  applicants {count}",
        id = proposal.id,
        title = proposal.title,
        deadline = proposal.application_deadline.format("%Y-%m-%d"),
        count = proposal.applicants.len(),
    )
}

pub fn applicant_line(applicant: &Applicant) -> String {
    let profile = &applicant.applicant;
    let actions = ApplicantActions::for_status(applicant.status);

    let mut available = Vec::new();
    if actions.can_decide {
        available.push("accept".to_string());
        available.push("reject".to_string());
    }
    if actions.can_show_contact {
        available.push("contact".to_string());
    }
    if actions.can_view_profile {
        available.push(format!("profile {}", profile_path(&profile.id)));
    }

    format!(
        "  - [{initials}] {name} ({title}) <{id}> {status}, applied {applied}{actions}",
        initials = profile.initials(),
        name = profile.display_name(),
        title = profile.title(),
        id = profile.id,
        status = applicant.status,
        applied = applicant.applied_on.format("%B %-d, %Y"),
        actions = if available.is_empty() {
            String::new()
        } else {
            format!("  [{}]", available.join(" | "))
        },
    )
}

pub fn tab_listing(tab: ProposalTab, proposals: &[Proposal]) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", tab.label(), proposals.len())];
    if proposals.is_empty() {
        lines.push(format!("  {}", tab.empty_message()));
    } else {
        lines.extend(proposals.iter().map(|proposal| format!("  {}", proposal_line(proposal))));
    }
    lines
}

pub fn managed_listing(proposals: &[Proposal]) -> Vec<String> {
    let mut lines = Vec::new();
    for proposal in proposals {
        lines.push(format!("{} ({:?})", proposal_line(proposal), proposal.status));
        lines.extend(proposal.applicants.iter().map(applicant_line));
    }
    lines
}

pub fn notice_line(notice: &Notice) -> String {
    let marker = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    if notice.description.is_empty() {
        format!("[{marker}] {}", notice.title)
    } else {
        format!("[{marker}] {}: {}", notice.title, notice.description)
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
