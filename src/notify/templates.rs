use askama::Template;

use crate::submission::Submission;

const NO_MESSAGE: &str = "No message provided";

#[derive(Template)]
#[template(path = "email/submission.html")]
struct SubmissionEmailTemplate<'a> {
    name: &'a str,
    email: &'a str,
    company: &'a str,
    message: &'a str,
}

pub fn subject(submission: &Submission) -> String {
    format!("New Contact Form Submission from {}", submission.name)
}

pub fn render_text(submission: &Submission) -> String {
    format!(
        "Name: {}\nEmail: {}\nCompany: {}\nMessage: {}",
        submission.name,
        submission.email,
        submission.company_or_default(),
        submission.message.as_deref().unwrap_or(NO_MESSAGE),
    )
}

/// HTML alternative. Field values are escaped by the template.
pub fn render_html(submission: &Submission) -> askama::Result<String> {
    SubmissionEmailTemplate {
        name: &submission.name,
        email: &submission.email,
        company: submission.company_or_default(),
        message: submission.message.as_deref().unwrap_or(NO_MESSAGE),
    }
    .render()
}
