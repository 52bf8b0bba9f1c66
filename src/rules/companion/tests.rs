use std::sync::Arc;

use futures::executor::block_on;

use super::keys::*;
use super::{Transcript, VoiceEvent, install};
use crate::{ActionTracker, Classification, Conversation, DialogLog, Inquiry, ResumeDirective};

struct Agent {
    conversation: Conversation,
    dialogs: Arc<DialogLog>,
    actions: Arc<ActionTracker>,
    voice: Arc<Transcript>,
}

impl Agent {
    fn new() -> Self {
        Self::with_voice(Transcript::new())
    }

    fn with_voice(voice: Transcript) -> Self {
        let dialogs = Arc::new(DialogLog::new());
        let actions = Arc::new(ActionTracker::new());
        let voice = Arc::new(voice);
        let mut conversation = Conversation::new(dialogs.clone(), actions.clone());
        install(conversation.registry_mut(), voice.clone());
        Agent { conversation, dialogs, actions, voice }
    }

    fn hear(&mut self, text: &str) -> Option<Inquiry> {
        self.conversation.resolve(&[text], true).unwrap()
    }

    fn hear_interim(&mut self, text: &str) -> Option<Inquiry> {
        self.conversation.resolve(&[text], false).unwrap()
    }

    fn reaction(&mut self, text: &str) -> Option<&'static str> {
        self.hear(text).map(|inquiry| inquiry.reaction())
    }
}

fn respond(inquiry: Inquiry) -> ResumeDirective {
    block_on(inquiry.respond_async()).unwrap()
}

#[test]
fn installs_the_whole_catalog() {
    let agent = Agent::new();
    let registry = agent.conversation.registry();
    assert_eq!(registry.len(), 18);
    assert!(registry.reaction_names().contains(&"before that"));
    assert!(!registry.constant().is_empty());
    assert_eq!(registry.absent_index().get(&SPEAKING_TO_USER).len(), 7);
}

#[test]
fn greets_back_right_after_saying_hello() {
    let mut agent = Agent::new();
    assert_eq!(agent.reaction("hi there"), None);

    agent.dialogs.spoke(HELLO);
    let inquiry = agent.hear("hi there").unwrap();
    assert_eq!(inquiry.reaction(), "hi back");
    assert_eq!(inquiry.classification(), Classification::Custom);
    assert_eq!(respond(inquiry), ResumeDirective::ContinueExistingTrain);
    assert_eq!(agent.voice.lines(), vec![NICE_TO_SEE_YOU]);

    // Still reachable one line later.
    agent.dialogs.spoke(SORRY);
    assert_eq!(agent.reaction("hey"), Some("hi back"));
}

#[test]
fn hello_back_waits_for_the_final_transcript() {
    let mut agent = Agent::new();
    agent.actions.begin(SPEAKING_TO_USER);

    assert!(agent.hear_interim("hello").is_none());
    assert_eq!(agent.reaction("hello"), Some("hello back"));
}

#[test]
fn great_question_is_not_fooled_by_negation() {
    let mut agent = Agent::new();
    agent.actions.begin(ASK_PROFILE_QUESTION);

    assert_eq!(agent.reaction("that's a great question"), Some("great question"));
    assert_eq!(agent.reaction("that's not a great question"), None);
    assert!(agent.hear_interim("good question").is_none());
    assert_eq!(agent.reaction("good question"), Some("great question"));

    agent.actions.finish(&ASK_PROFILE_QUESTION);
    assert_eq!(agent.reaction("that's a great question"), None);
}

#[test]
fn too_bright_dims_the_light_and_apologizes() {
    let mut agent = Agent::new();
    agent.actions.begin(BRIGHTENING_LIGHT);

    let inquiry = agent.hear("ouch").unwrap();
    assert_eq!(respond(inquiry), ResumeDirective::ContinueExistingTrain);
    assert_eq!(agent.voice.events(), vec![VoiceEvent::DimmedLight, VoiceEvent::Said(vec![SORRY])]);
}

#[test]
fn move_on_needs_something_to_skip() {
    let mut agent = Agent::new();
    assert_eq!(agent.reaction("let's move on"), None);

    agent.actions.begin(PERFORMING_HUMOR);
    let inquiry = agent.hear("let's move on").unwrap();
    assert_eq!(inquiry.classification(), Classification::RequestMoveOn);
    assert_eq!(respond(inquiry), ResumeDirective::ContinueExistingTrain);
    assert_eq!(agent.voice.lines(), vec![SURE_LETS_SKIP_IT]);
    agent.actions.finish(&PERFORMING_HUMOR);

    // A profile question is only skipped while it is still being asked.
    agent.actions.begin(ASK_PROFILE_QUESTION);
    assert_eq!(agent.reaction("move on"), None);
    agent.dialogs.set_speaking(true);
    assert_eq!(agent.reaction("move on"), Some("move on"));
}

#[test]
fn i_get_it_cuts_the_agent_short() {
    let mut agent = Agent::new();
    assert_eq!(agent.reaction("ok i get it"), None);

    agent.dialogs.set_speaking(true);
    let inquiry = agent.hear("ok i get it").unwrap();
    assert_eq!(inquiry.classification(), Classification::IGetIt);
    respond(inquiry);
    assert_eq!(agent.voice.events().first(), Some(&VoiceEvent::Stopped));
}

#[test]
fn asking_a_question_repeats_the_interrupted_line() {
    let mut agent = Agent::new();
    assert!(agent.hear_interim("can i ask a question").is_none());

    let inquiry = agent.hear("can I ask you a question").unwrap();
    assert_eq!(inquiry.classification(), Classification::RequestAskQuestion);
    assert_eq!(respond(inquiry), ResumeDirective::RepeatCurrentDialog);
}

#[test]
fn before_that_follows_a_repeat_request() {
    let voice = Transcript::new().with_previous_to_last(Some(WELCOME_BACK));
    let mut agent = Agent::with_voice(voice);

    assert_eq!(agent.reaction("and before that"), None);

    let repeat = agent.hear("can you repeat that").unwrap();
    assert_eq!(repeat.classification(), Classification::WhatDidYouSay);
    respond(repeat);

    let before = agent.hear("and before that").unwrap();
    assert_eq!(before.classification(), Classification::BeforeThat);
    respond(before);

    // Chains: "before that" may follow another "before that".
    assert_eq!(agent.reaction("what about before that"), Some("before that"));

    assert_eq!(
        agent.voice.events(),
        vec![VoiceEvent::RepeatedLastDialog, VoiceEvent::Said(vec![BEFORE_THAT_I_SAID, WELCOME_BACK])]
    );
}

#[test]
fn small_talk_waits_until_the_agent_is_quiet() {
    let mut agent = Agent::new();
    agent.actions.begin(SPEAKING_TO_USER);
    assert_eq!(agent.reaction("are you ok"), None);
    assert_eq!(agent.reaction("can you repeat that"), None);

    agent.actions.finish(&SPEAKING_TO_USER);
    assert_eq!(agent.reaction("are you ok"), Some("are you ok"));
    assert_eq!(agent.reaction("how are you"), Some("how are you"));
    assert_eq!(agent.reaction("hello are you there"), Some("are you there"));
}

#[test]
fn rate_changes_need_a_capable_voice() {
    let mut agent = Agent::new();
    assert_eq!(agent.reaction("please speed up"), None);

    let mut agent = Agent::with_voice(Transcript::new().with_rate_control(true));
    let inquiry = agent.hear("please speed up").unwrap();
    assert_eq!(inquiry.reaction(), "speed up");
    assert_eq!(respond(inquiry), ResumeDirective::ContinueExistingTrain);

    let inquiry = agent.hear("could you talk slower").unwrap();
    respond(inquiry);
    assert_eq!(
        agent.voice.events(),
        vec![VoiceEvent::RateChanged { faster: true }, VoiceEvent::RateChanged { faster: false }]
    );
}
