use chrono::NaiveDate;

use crate::models::{ItemBody, MasteryItem};
use crate::srs::MAX_MASTERY_LEVEL;

pub struct FeedbackGenerator;

impl FeedbackGenerator {
    /// Message shown after a review, built from the item's updated state.
    pub fn review_message(item: &MasteryItem, success: bool, today: NaiveDate) -> String {
        let days = (item.next_review_date - today).num_days();
        let schedule = format!(
            "Mastery {}/{}. Next review in {} day{}.",
            item.mastery_level,
            MAX_MASTERY_LEVEL,
            days,
            if days == 1 { "" } else { "s" }
        );

        if success {
            return format!("Correct! {}", schedule);
        }

        let mut msg = match &item.body {
            ItemBody::Quiz(question) => {
                let mut msg = format!("Not quite. The correct answer is '{}'.", question.correct_answer);
                if !question.explanation.trim().is_empty() {
                    msg.push(' ');
                    msg.push_str(question.explanation.trim());
                }
                msg
            }
            ItemBody::Flashcard(card) => {
                format!("Keep at it. {}: {}", card.term, card.definition)
            }
        };
        msg.push(' ');
        msg.push_str(&schedule);
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Flashcard, QuizQuestion};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_success_message_shows_schedule() {
        let mut item = MasteryItem::new(
            ItemBody::Flashcard(Flashcard {
                id: "t".into(),
                term: "Osmosis".into(),
                definition: "Water crossing a membrane".into(),
            }),
            today(),
        );
        item.mastery_level = 1;
        item.next_review_date = today() + Duration::days(2);

        let msg = FeedbackGenerator::review_message(&item, true, today());
        assert_eq!(msg, "Correct! Mastery 1/6. Next review in 2 days.");
    }

    #[test]
    fn test_failed_question_reveals_answer() {
        let mut item = MasteryItem::new(
            ItemBody::Quiz(QuizQuestion {
                id: "q".into(),
                question: "Powerhouse of the cell?".into(),
                options: vec!["Nucleus".into(), "Mitochondria".into()],
                correct_answer: "Mitochondria".into(),
                explanation: "It produces ATP.".into(),
            }),
            today(),
        );
        item.next_review_date = today() + Duration::days(1);

        let msg = FeedbackGenerator::review_message(&item, false, today());
        assert_eq!(
            msg,
            "Not quite. The correct answer is 'Mitochondria'. It produces ATP. Mastery 0/6. Next review in 1 day."
        );
    }
}
