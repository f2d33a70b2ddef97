//! Reservation dialogue sessions.
//!
//! A session walks a fixed, forward-only sequence of questions: adult
//! count, child count, date, time. Each answer fills exactly one slot, and
//! a filled slot is never overwritten. Once every slot is filled the
//! session sits in [`DialogueState::Result`] and keeps returning the
//! priced confirmation.

use crate::error::DialogueError;
use crate::reply::OutboundReply;
use crate::slot::{extract_first_integer, total_price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prompt used when the dialogue is waiting for the adult count and the
/// NLU service returned no fulfillment text of its own.
pub const ASK_ADULTS_PROMPT: &str = "How many adults will be attending?";
/// Prompt for the child count.
pub const ASK_CHILDREN_PROMPT: &str = "How many children will be attending?";
/// Prompt for the reservation date.
pub const ASK_DATE_PROMPT: &str = "Please provide a reservation date.";
/// Prompt for the reservation time.
pub const ASK_TIME_PROMPT: &str = "Please provide a reservation time.";

/// Where a session is in the reservation dialogue.
///
/// Variants are declared in dialogue order, so `Ord` follows progress.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    /// Waiting for the number of adults.
    #[default]
    AskAdults,
    /// Waiting for the number of children.
    AskChildren,
    /// Waiting for the reservation date.
    AskDate,
    /// Waiting for the reservation time.
    AskTime,
    /// All slots collected.
    Result,
}

impl DialogueState {
    /// The state that follows this one. `Result` is terminal.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::AskAdults => Self::AskChildren,
            Self::AskChildren => Self::AskDate,
            Self::AskDate => Self::AskTime,
            Self::AskTime | Self::Result => Self::Result,
        }
    }

    /// Returns true once every slot has been collected.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Result)
    }

    /// The slot this state is collecting, if any.
    #[must_use]
    pub fn slot(self) -> Option<Slot> {
        match self {
            Self::AskAdults => Some(Slot::Adults),
            Self::AskChildren => Some(Slot::Children),
            Self::AskDate => Some(Slot::Date),
            Self::AskTime => Some(Slot::Time),
            Self::Result => None,
        }
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AskAdults => "ask_adults",
            Self::AskChildren => "ask_children",
            Self::AskDate => "ask_date",
            Self::AskTime => "ask_time",
            Self::Result => "result",
        };
        f.write_str(name)
    }
}

/// A piece of information the dialogue collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Adults,
    Children,
    Date,
    Time,
}

impl Slot {
    /// The question that asks for this slot.
    #[must_use]
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Adults => ASK_ADULTS_PROMPT,
            Self::Children => ASK_CHILDREN_PROMPT,
            Self::Date => ASK_DATE_PROMPT,
            Self::Time => ASK_TIME_PROMPT,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Adults => "number of adults",
            Self::Children => "number of children",
            Self::Date => "reservation date",
            Self::Time => "reservation time",
        };
        f.write_str(name)
    }
}

/// One caller's reservation dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    state: DialogueState,
    number_of_adults: Option<u32>,
    number_of_children: Option<u32>,
    reservation_date: Option<String>,
    reservation_time: Option<String>,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSession {
    /// Creates a session waiting for the adult count.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            state: DialogueState::AskAdults,
            number_of_adults: None,
            number_of_children: None,
            reservation_date: None,
            reservation_time: None,
            created_at: now,
            last_active_at: now,
        }
    }

    #[must_use]
    pub fn state(&self) -> DialogueState {
        self.state
    }

    #[must_use]
    pub fn number_of_adults(&self) -> Option<u32> {
        self.number_of_adults
    }

    #[must_use]
    pub fn number_of_children(&self) -> Option<u32> {
        self.number_of_children
    }

    #[must_use]
    pub fn reservation_date(&self) -> Option<&str> {
        self.reservation_date.as_deref()
    }

    #[must_use]
    pub fn reservation_time(&self) -> Option<&str> {
        self.reservation_time.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    /// Returns true when every slot holds a value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.number_of_adults.is_some()
            && self.number_of_children.is_some()
            && self.reservation_date.is_some()
            && self.reservation_time.is_some()
    }

    /// Price of the reservation, once both counts are known.
    #[must_use]
    pub fn total_price(&self) -> Option<u64> {
        Some(total_price(self.number_of_adults?, self.number_of_children?))
    }

    /// Feeds one inbound message through the dialogue.
    ///
    /// `fulfillment_text` is the NLU reply for the same message; it is
    /// returned when the dialogue has no prompt of its own to send. Input
    /// that doesn't fill the pending slot leaves the session where it was.
    pub fn advance(&mut self, user_text: &str, fulfillment_text: &str) -> OutboundReply {
        self.last_active_at = Utc::now();

        let filled = match self.state {
            DialogueState::AskAdults => fill_count(&mut self.number_of_adults, user_text),
            DialogueState::AskChildren => fill_count(&mut self.number_of_children, user_text),
            DialogueState::AskDate => fill_text(&mut self.reservation_date, user_text),
            DialogueState::AskTime => fill_text(&mut self.reservation_time, user_text),
            DialogueState::Result => false,
        };
        if filled {
            self.state = self.state.next();
        }

        self.reply(fulfillment_text)
    }

    /// Like [`advance`](Self::advance), but rejects count answers that
    /// contain no number instead of silently asking again.
    ///
    /// # Errors
    ///
    /// Returns [`DialogueError::InvalidSlotValue`] when the session is
    /// waiting for an unset count and `user_text` has no digits. Only the
    /// activity timestamp changes in that case.
    pub fn try_advance(
        &mut self,
        user_text: &str,
        fulfillment_text: &str,
    ) -> Result<OutboundReply, DialogueError> {
        let pending_count = match self.state {
            DialogueState::AskAdults if self.number_of_adults.is_none() => Some(Slot::Adults),
            DialogueState::AskChildren if self.number_of_children.is_none() => {
                Some(Slot::Children)
            }
            _ => None,
        };

        if let Some(slot) = pending_count
            && extract_first_integer(user_text).is_none()
        {
            self.last_active_at = Utc::now();
            return Err(DialogueError::InvalidSlotValue {
                slot,
                input: user_text.to_string(),
            });
        }

        Ok(self.advance(user_text, fulfillment_text))
    }

    /// Builds the reply for the current state.
    fn reply(&self, fulfillment_text: &str) -> OutboundReply {
        match self.state {
            DialogueState::AskAdults if fulfillment_text.trim().is_empty() => {
                OutboundReply::text(ASK_ADULTS_PROMPT)
            }
            DialogueState::AskAdults => OutboundReply::text(fulfillment_text),
            DialogueState::AskChildren => OutboundReply::text(ASK_CHILDREN_PROMPT),
            DialogueState::AskDate => OutboundReply::text(ASK_DATE_PROMPT),
            DialogueState::AskTime => OutboundReply::text(ASK_TIME_PROMPT),
            DialogueState::Result => self
                .confirmation()
                .unwrap_or_else(|| OutboundReply::text(fulfillment_text)),
        }
    }

    fn confirmation(&self) -> Option<OutboundReply> {
        let (Some(adults), Some(children), Some(date), Some(time)) = (
            self.number_of_adults,
            self.number_of_children,
            self.reservation_date.as_deref(),
            self.reservation_time.as_deref(),
        ) else {
            return None;
        };

        let price = total_price(adults, children);
        Some(OutboundReply::priced(
            format!(
                "Your reservation for {adults} adults and {children} children on {date} at {time} is confirmed. Total price: {price}."
            ),
            price,
        ))
    }
}

/// Fills a count slot from the first number in `text`.
///
/// Returns true when the slot holds a value afterwards.
fn fill_count(slot: &mut Option<u32>, text: &str) -> bool {
    if slot.is_some() {
        return true;
    }
    match extract_first_integer(text) {
        Some(n) => {
            *slot = Some(n);
            true
        }
        None => false,
    }
}

/// Stores `text` verbatim in a free-text slot.
fn fill_text(slot: &mut Option<String>, text: &str) -> bool {
    if slot.is_some() {
        return true;
    }
    if text.is_empty() {
        return false;
    }
    *slot = Some(text.to_string());
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const NLU: &str = "Sure, I can help you book a table.";

    fn session_in(state: DialogueState) -> ConversationSession {
        let mut session = ConversationSession::new();
        let answers = ["3", "2", "Friday", "7pm"];
        for answer in answers {
            if session.state() == state {
                break;
            }
            session.advance(answer, NLU);
        }
        assert_eq!(session.state(), state);
        session
    }

    #[test]
    fn new_session_asks_for_adults() {
        let session = ConversationSession::new();
        assert_eq!(session.state(), DialogueState::AskAdults);
        assert!(!session.is_complete());
        assert_eq!(session.total_price(), None);
    }

    #[test]
    fn adults_answer_moves_to_children() {
        let mut session = ConversationSession::new();
        let reply = session.advance("3 adults", NLU);

        assert_eq!(session.number_of_adults(), Some(3));
        assert_eq!(session.state(), DialogueState::AskChildren);
        assert_eq!(reply.fulfillment_text, ASK_CHILDREN_PROMPT);
        assert_eq!(reply.total_price, None);
    }

    #[test]
    fn children_answer_moves_to_date() {
        let mut session = session_in(DialogueState::AskChildren);
        let reply = session.advance("2", NLU);

        assert_eq!(session.number_of_adults(), Some(3));
        assert_eq!(session.number_of_children(), Some(2));
        assert_eq!(session.state(), DialogueState::AskDate);
        assert_eq!(reply.fulfillment_text, ASK_DATE_PROMPT);
    }

    #[test]
    fn date_is_stored_verbatim() {
        let mut session = session_in(DialogueState::AskDate);
        let reply = session.advance("next Friday, please", NLU);

        assert_eq!(session.reservation_date(), Some("next Friday, please"));
        assert_eq!(session.state(), DialogueState::AskTime);
        assert_eq!(reply.fulfillment_text, ASK_TIME_PROMPT);
    }

    #[test]
    fn time_answer_completes_with_priced_confirmation() {
        let mut session = session_in(DialogueState::AskTime);
        let reply = session.advance("7pm", NLU);

        assert_eq!(session.reservation_time(), Some("7pm"));
        assert_eq!(session.state(), DialogueState::Result);
        assert!(session.is_complete());
        assert_eq!(reply.total_price, Some(400));
        for needle in ["3 adults", "2 children", "Friday", "7pm", "400"] {
            assert!(
                reply.fulfillment_text.contains(needle),
                "reply {:?} is missing {needle:?}",
                reply.fulfillment_text
            );
        }
    }

    #[test]
    fn result_is_sticky_and_keeps_confirming() {
        let mut session = session_in(DialogueState::Result);
        let reply = session.advance("actually 10 adults", NLU);

        assert_eq!(session.state(), DialogueState::Result);
        assert_eq!(session.number_of_adults(), Some(3));
        assert_eq!(reply.total_price, Some(400));
    }

    #[test]
    fn non_numeric_count_stays_put_and_relays_nlu_text() {
        let mut session = ConversationSession::new();
        let reply = session.advance("hello there", NLU);

        assert_eq!(session.state(), DialogueState::AskAdults);
        assert_eq!(session.number_of_adults(), None);
        assert_eq!(reply.fulfillment_text, NLU);
    }

    #[test]
    fn blank_nlu_text_falls_back_to_adults_prompt() {
        let mut session = ConversationSession::new();
        let reply = session.advance("hi", "  ");
        assert_eq!(reply.fulfillment_text, ASK_ADULTS_PROMPT);
    }

    #[test]
    fn non_numeric_children_answer_repeats_prompt() {
        let mut session = session_in(DialogueState::AskChildren);
        let reply = session.advance("none of them", NLU);

        assert_eq!(session.state(), DialogueState::AskChildren);
        assert_eq!(reply.fulfillment_text, ASK_CHILDREN_PROMPT);
    }

    #[test]
    fn zero_children_is_accepted() {
        let mut session = session_in(DialogueState::AskChildren);
        session.advance("0", NLU);
        assert_eq!(session.number_of_children(), Some(0));
        assert_eq!(session.state(), DialogueState::AskDate);
    }

    #[test]
    fn empty_text_fills_nothing() {
        let mut date = session_in(DialogueState::AskDate);
        date.advance("", NLU);
        assert_eq!(date.state(), DialogueState::AskDate);
        assert_eq!(date.reservation_date(), None);

        let mut time = session_in(DialogueState::AskTime);
        time.advance("", NLU);
        assert_eq!(time.state(), DialogueState::AskTime);
    }

    #[test]
    fn slots_are_never_overwritten() {
        let inputs = [
            "4 adults", "hmm", "1 child", "5", "Saturday", "12", "8pm", "9pm", "3",
        ];
        let mut session = ConversationSession::new();
        let mut seen: Vec<(Option<u32>, Option<u32>, Option<String>, Option<String>)> = Vec::new();

        for input in inputs {
            session.advance(input, NLU);
            seen.push((
                session.number_of_adults(),
                session.number_of_children(),
                session.reservation_date().map(str::to_string),
                session.reservation_time().map(str::to_string),
            ));
        }

        for pair in seen.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            if before.0.is_some() {
                assert_eq!(before.0, after.0);
            }
            if before.1.is_some() {
                assert_eq!(before.1, after.1);
            }
            if before.2.is_some() {
                assert_eq!(before.2, after.2);
            }
            if before.3.is_some() {
                assert_eq!(before.3, after.3);
            }
        }
        assert_eq!(session.number_of_adults(), Some(4));
        assert_eq!(session.number_of_children(), Some(1));
        assert_eq!(session.reservation_date(), Some("5"));
        assert_eq!(session.reservation_time(), Some("Saturday"));
    }

    #[test]
    fn state_never_regresses_and_fills_at_most_one_slot() {
        let inputs = ["", "x", "2", "", "y", "3", "today", "", "noon", "again", "7"];
        let mut session = ConversationSession::new();

        for input in inputs {
            let before_state = session.state();
            let before_filled = filled_slots(&session);

            session.advance(input, NLU);

            assert!(session.state() >= before_state);
            let after_filled = filled_slots(&session);
            assert!(after_filled - before_filled <= 1);
            assert_eq!(session.state().is_terminal(), session.is_complete());
        }
    }

    fn filled_slots(session: &ConversationSession) -> usize {
        [
            session.number_of_adults().is_some(),
            session.number_of_children().is_some(),
            session.reservation_date().is_some(),
            session.reservation_time().is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    #[test]
    fn try_advance_rejects_count_without_digits() {
        let mut session = ConversationSession::new();
        let err = session.try_advance("a couple", NLU).unwrap_err();

        assert_eq!(
            err,
            DialogueError::InvalidSlotValue {
                slot: Slot::Adults,
                input: "a couple".to_string(),
            }
        );
        assert_eq!(session.state(), DialogueState::AskAdults);
    }

    #[test]
    fn rejected_count_still_counts_as_activity() {
        let mut session = ConversationSession::new();
        let before = session.last_active_at();
        std::thread::sleep(std::time::Duration::from_millis(2));

        assert!(session.try_advance("a couple", NLU).is_err());
        assert!(session.last_active_at() > before);
        assert_eq!(session.number_of_adults(), None);
    }

    fn restored(state: &str, adults: Option<u32>, children: Option<u32>) -> ConversationSession {
        let now = Utc::now();
        serde_json::from_value(serde_json::json!({
            "state": state,
            "number_of_adults": adults,
            "number_of_children": children,
            "reservation_date": null,
            "reservation_time": null,
            "created_at": now,
            "last_active_at": now,
        }))
        .expect("deserialize")
    }

    #[test]
    fn preset_adult_count_moves_on_without_reparsing() {
        let mut session = restored("ask_adults", Some(3), None);
        let reply = session.advance("7 adults", NLU);

        assert_eq!(session.number_of_adults(), Some(3));
        assert_eq!(session.state(), DialogueState::AskChildren);
        assert_eq!(reply.fulfillment_text, ASK_CHILDREN_PROMPT);
    }

    #[test]
    fn preset_child_count_moves_on_without_reparsing() {
        let mut session = restored("ask_children", Some(3), Some(2));
        let reply = session.advance("5 kids", NLU);

        assert_eq!(session.number_of_children(), Some(2));
        assert_eq!(session.state(), DialogueState::AskDate);
        assert_eq!(reply.fulfillment_text, ASK_DATE_PROMPT);
    }

    #[test]
    fn try_advance_accepts_free_text_slots() {
        let mut session = session_in(DialogueState::AskDate);
        let reply = session.try_advance("tomorrow", NLU).expect("date accepted");
        assert_eq!(reply.fulfillment_text, ASK_TIME_PROMPT);
    }

    #[test]
    fn state_order_follows_dialogue() {
        assert!(DialogueState::AskAdults < DialogueState::AskChildren);
        assert!(DialogueState::AskChildren < DialogueState::AskDate);
        assert!(DialogueState::AskDate < DialogueState::AskTime);
        assert!(DialogueState::AskTime < DialogueState::Result);
        assert_eq!(DialogueState::Result.next(), DialogueState::Result);
        assert_eq!(DialogueState::Result.slot(), None);
    }

    #[test]
    fn each_question_state_prompts_for_its_slot() {
        assert_eq!(
            DialogueState::AskChildren.slot().map(Slot::prompt),
            Some(ASK_CHILDREN_PROMPT)
        );
        assert_eq!(Slot::Adults.prompt(), ASK_ADULTS_PROMPT);
        assert_eq!(Slot::Time.to_string(), "reservation time");
    }

    #[test]
    fn session_serde_roundtrip() {
        let session = session_in(DialogueState::AskTime);
        let json = serde_json::to_string(&session).expect("serialize");
        let parsed: ConversationSession = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(parsed.state(), DialogueState::AskTime);
        assert_eq!(parsed.reservation_date(), Some("Friday"));
    }
}
