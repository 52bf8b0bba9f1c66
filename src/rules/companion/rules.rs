use std::sync::Arc;

use chrono::Local;

use super::keys::*;
use super::voice::Voice;
use crate::{ActionTag, Classification, DialogId, Reaction, Registry, Resume, ResumeDirective, Situation, Triggers};

/// Actions a user may ask to skip.
pub static SKIPPABLE_ACTIONS: [ActionTag; 5] =
    [HANDLING_USER_QUESTION, PERFORMING_HUMOR, ASK_PROFILE_QUESTION, DISPLAYING_PRIVACY_POLICY, DISPLAYING_TERMS_OF_SERVICE];

/// Actions during which "I get it" means "stop explaining".
static I_GET_IT_ACTIONS: [ActionTag; 4] =
    [HANDLING_USER_QUESTION, PERFORMING_HUMOR, DISPLAYING_PRIVACY_POLICY, DISPLAYING_TERMS_OF_SERVICE];

type Entry = (Reaction, Triggers);

/// Speak `lines`, then carry on with the interrupted conversation.
fn say(voice: &Arc<dyn Voice>, lines: Vec<DialogId>, resume: Resume) {
    voice.speak(lines, Box::new(move || resume.continue_existing_train()));
}

/// "Too bright", while the screen is lit up to see the user's face.
fn rule_too_bright(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "too bright",
        patterns: [words!("too bright"), words!("ouch")],
        handler: move |resume| {
            voice.dim_light();
            say(&voice, vec![SORRY], resume);
        },
    };
    (reaction, Triggers::new().during([MAKING_WHITE_LIGHT, BRIGHTENING_LIGHT]))
}

fn rule_me_too(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "me too",
        patterns: [words!("me too")],
        handler: move |resume| say(&voice, vec![HAPPY_TO_HEAR_THAT], resume),
    };
    let triggers = Triggers::new().while_speaking([
        WELCOME_BACK_LETS_GET_STARTED,
        IM_GLAD_YOURE_ENJOYING_THE_EXPERIENCE,
        IM_EXCITED_TO_CONTINUE,
        IM_FINE,
        YES_IM_HERE,
    ]);
    (reaction, triggers)
}

fn rule_youre_funny(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "you're funny",
        patterns: [words!("you're funny"), words!("you are funny")],
        handler: move |resume| say(&voice, vec![THANK_YOU], resume),
    };
    (reaction, Triggers::new().while_speaking([IM_FUNNY]))
}

/// A compliment on a profile question. "That's not a great question" is not
/// one.
fn rule_great_question(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "great question",
        patterns: [words!("great question"), words!("good question").final_only()],
        exclusions: [words!("not great"), words!("not good"), words!("not a question")],
        handler: move |resume| say(&voice, vec![THANK_YOU], resume),
    };
    (reaction, Triggers::new().during([ASK_PROFILE_QUESTION]))
}

fn rule_hi(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "hi back",
        patterns: [words!("hi"), words!("hey")],
        handler: move |resume| say(&voice, vec![NICE_TO_SEE_YOU], resume),
    };
    (reaction, Triggers::new().while_speaking([HELLO, WELCOME_BACK, WELL_HELLO_THERE, WELCOME_BACK_LETS_GET_STARTED]))
}

fn rule_hello(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "hello back",
        patterns: [words!("hello").final_only()],
        handler: move |resume| say(&voice, vec![HELLO], resume),
    };
    (reaction, Triggers::new().during([SPEAKING_TO_USER]))
}

/// The user wants to ask something; pick the current line up again after.
fn rule_ask_question(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "ask a question",
        patterns: [
            words!("i have a question"),
            re!(r"(?i)\b(can|could|may) i ask (you )?(a|another) question\b").final_only(),
        ],
        classification: Classification::RequestAskQuestion,
        handler: move |resume: Resume| {
            voice.speak(vec![SURE_GO_AHEAD], Box::new(move || resume.repeat_current_dialog()));
        },
    };
    (reaction, Triggers::always())
}

/// Whether a skip request is for this catalog. A profile question is only
/// skipped here while the agent is still asking it.
fn wants_to_skip(situation: &Situation<'_>) -> bool {
    let others = SKIPPABLE_ACTIONS.iter().filter(|tag| **tag != ASK_PROFILE_QUESTION);
    if situation.any_occurring(others) {
        return true;
    }
    situation.is_occurring(&ASK_PROFILE_QUESTION) && situation.is_speaking()
}

fn rule_move_on(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "move on",
        patterns: [words!("move on"), words!("skip it"), words!("go on"), words!("next").final_only()],
        classification: Classification::RequestMoveOn,
        precondition: wants_to_skip,
        handler: move |resume| {
            voice.stop();
            say(&voice, vec![SURE_LETS_SKIP_IT], resume);
        },
    };
    (reaction, Triggers::always())
}

fn rule_i_get_it(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "i get it",
        patterns: [words!("i get it"), words!("never mind"), words!("nevermind"), words!("i'm finished")],
        classification: Classification::IGetIt,
        precondition: |situation: &Situation<'_>| situation.is_speaking() || situation.any_occurring(&I_GET_IT_ACTIONS),
        handler: move |resume| {
            voice.stop();
            say(&voice, vec![OK], resume);
        },
    };
    (reaction, Triggers::always())
}

fn rule_repeat_question(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "repeat the question",
        patterns: [words!("repeat the question"), words!("what was the question")],
        handler: move |resume: Resume| voice.repeat_last_question(Box::new(move || resume.continue_existing_train())),
    };
    (reaction, Triggers::new().not_during([SPEAKING_TO_USER]))
}

fn rule_repeat_that(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "repeat that",
        patterns: [words!("repeat that"), words!("say that again"), words!("what did you say").final_only()],
        classification: Classification::WhatDidYouSay,
        handler: move |resume: Resume| voice.repeat_last_dialog(Box::new(move || resume.continue_existing_train())),
    };
    (reaction, Triggers::new().not_during([SPEAKING_TO_USER]))
}

/// Only meaningful right after the user asked for a repeat.
fn rule_before_that(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "before that",
        patterns: [words!("before that")],
        classification: Classification::BeforeThat,
        precondition: |situation: &Situation<'_>| {
            situation.previous_inquiry_was(&[Classification::BeforeThat, Classification::WhatDidYouSay])
        },
        handler: move |resume| {
            let lines = match voice.previous_to_last_line() {
                Some(line) => vec![BEFORE_THAT_I_SAID, line],
                None => vec![I_DIDNT_SAY_ANYTHING_BEFORE_THAT],
            };
            say(&voice, lines, resume);
        },
    };
    (reaction, Triggers::new().not_during([SPEAKING_TO_USER]))
}

fn rule_are_you_ok(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "are you ok",
        patterns: [words!("are you ok"), words!("are you okay")],
        handler: move |resume| say(&voice, vec![YES, IM_FINE], resume),
    };
    (reaction, Triggers::new().not_during([SPEAKING_TO_USER]))
}

fn rule_how_are_you(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "how are you",
        patterns: [words!("how are you")],
        handler: move |resume| say(&voice, vec![IM_FINE], resume),
    };
    (reaction, Triggers::new().not_during([SPEAKING_TO_USER]))
}

fn rule_im_thinking(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "i'm thinking",
        patterns: [words!("i'm thinking"), words!("let me think")],
        handler: move |resume| say(&voice, vec![YOU_ARE_ALLOWED_TO_THINK], resume),
    };
    (reaction, Triggers::new().not_during([SPEAKING_TO_USER]))
}

fn rule_are_you_there(voice: &Arc<dyn Voice>) -> Entry {
    let voice = Arc::clone(voice);
    let reaction = reaction! {
        name: "are you there",
        patterns: [words!("are you there"), words!("anybody there")],
        handler: move |resume| say(&voice, vec![YES_IM_HERE], resume),
    };
    (reaction, Triggers::new().not_during([SPEAKING_TO_USER]))
}

/// Change the speaking rate. A long detour means the user has lost the
/// thread, so the interrupted line is spoken again.
fn rule_speed_change(voice: &Arc<dyn Voice>, faster: bool) -> Entry {
    let (name, patterns) = if faster {
        ("speed up", vec![words!("speed up"), words!("talk faster"), words!("faster please")])
    } else {
        ("slow down", vec![words!("slow down"), words!("talk slower"), words!("slower please")])
    };

    let capable = Arc::clone(voice);
    let voice = Arc::clone(voice);
    let reaction = Reaction::builder(name)
        .patterns(patterns)
        .precondition(move |_| capable.can_change_rate())
        .handler(move |resume| {
            let before = Local::now();
            voice.change_rate(
                faster,
                Box::new(move || resume.resume(ResumeDirective::after_interruption(Local::now() - before))),
            );
        });
    (reaction, Triggers::always())
}

/// Register the companion catalog.
///
/// Order matters only within a tier; the catalog relies on tiers for
/// priority and registers broad constant rules last.
pub fn install(registry: &mut Registry, voice: Arc<dyn Voice>) {
    let entries = vec![
        rule_too_bright(&voice),
        rule_me_too(&voice),
        rule_youre_funny(&voice),
        rule_great_question(&voice),
        rule_hi(&voice),
        rule_hello(&voice),
        rule_repeat_question(&voice),
        rule_repeat_that(&voice),
        rule_before_that(&voice),
        rule_are_you_ok(&voice),
        rule_how_are_you(&voice),
        rule_im_thinking(&voice),
        rule_are_you_there(&voice),
        rule_ask_question(&voice),
        rule_move_on(&voice),
        rule_i_get_it(&voice),
        rule_speed_change(&voice, true),
        rule_speed_change(&voice, false),
    ];

    tracing::debug!(reactions = entries.len(), "installing companion catalog");
    for (reaction, triggers) in entries {
        registry.register(reaction, triggers);
    }
}
