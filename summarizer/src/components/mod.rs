mod file_form;
mod history;
mod notices;
mod result_view;
pub mod summarizer;
mod text_form;
