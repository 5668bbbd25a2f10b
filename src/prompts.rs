//! Every message the bot sends to a user.
//!
//! Keeping the texts in one place lets tests assert on exact replies without
//! duplicating string literals across the state machine and the test suite.

pub const WELCOME: &str = "Welcome! Please enter the building type:";
pub const ASK_LOCATION: &str = "Please enter the location:";
pub const ASK_FIRE_SAFETY: &str = "Please enter the fire safety measures:";
pub const ASK_CUSTOMER_ID: &str = "Please enter your customer ID:";
pub const ASK_DOCUMENTS: &str = "Please upload the relevant documents:";

pub const INVALID_FILE_TYPE: &str = "Invalid file type. Please upload PDF, JPG, or PNG only.";
pub const MISSING_UPLOAD: &str = "Please upload valid documents.";
pub const UPLOAD_FAILED: &str =
    "Sorry, the document could not be saved. Please upload it again.";

pub const PDF_RECEIVED: &str =
    "PDF received and processed. Please confirm your submission (yes/no):";

pub const SUBMISSION_RECEIVED: &str = "Thank you! Your submission has been received.";
pub const SUBMISSION_CANCELLED: &str =
    "Submission cancelled. You can start over by sending /start.";
pub const ASK_YES_NO: &str = "Please reply with 'yes' or 'no'.";

pub const OPERATION_CANCELLED: &str =
    "Operation cancelled. You can start over by sending /start.";

/// Reply for an accepted image upload, echoing the recognised text.
pub fn image_received(recognized: &str) -> String {
    format!(
        "OCR Result: {}\n\nDocuments received successfully. Please confirm your submission (yes/no):",
        recognized
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_reply_embeds_text_and_confirm_prompt() {
        let reply = image_received("EXIT SIGN");
        assert!(reply.starts_with("OCR Result: EXIT SIGN\n\n"));
        assert!(reply.ends_with("(yes/no):"));
    }
}
