//! Dialog ids and action tags used by the companion catalog.

use crate::{ActionTag, DialogId};

// Actions
pub const SPEAKING_TO_USER: ActionTag = ActionTag::from_static("speaking_to_user");
pub const MAKING_WHITE_LIGHT: ActionTag = ActionTag::from_static("making_white_light_to_make_face_visible");
pub const BRIGHTENING_LIGHT: ActionTag = ActionTag::from_static("brightening_light_to_make_face_visible");
pub const ASK_PROFILE_QUESTION: ActionTag = ActionTag::from_static("ask_profile_question");
pub const HANDLING_USER_QUESTION: ActionTag = ActionTag::from_static("handling_user_question");
pub const PERFORMING_HUMOR: ActionTag = ActionTag::from_static("performing_humor");
pub const DISPLAYING_PRIVACY_POLICY: ActionTag = ActionTag::from_static("displaying_privacy_policy");
pub const DISPLAYING_TERMS_OF_SERVICE: ActionTag = ActionTag::from_static("displaying_terms_of_service");

// Lines the agent says first
pub const HELLO: DialogId = DialogId::from_static("hello");
pub const WELCOME_BACK: DialogId = DialogId::from_static("welcome_back");
pub const WELL_HELLO_THERE: DialogId = DialogId::from_static("well_hello_there");
pub const WELCOME_BACK_LETS_GET_STARTED: DialogId = DialogId::from_static("welcome_back_lets_get_started");
pub const IM_GLAD_YOURE_ENJOYING_THE_EXPERIENCE: DialogId =
    DialogId::from_static("im_glad_youre_enjoying_the_experience");
pub const IM_EXCITED_TO_CONTINUE: DialogId = DialogId::from_static("im_excited_to_continue_working_with_you");
pub const IM_FUNNY: DialogId = DialogId::from_static("oh_my_gosh_im_funny");

// Replies
pub const SORRY: DialogId = DialogId::from_static("sorry");
pub const HAPPY_TO_HEAR_THAT: DialogId = DialogId::from_static("happy_to_hear_that");
pub const THANK_YOU: DialogId = DialogId::from_static("thank_you");
pub const NICE_TO_SEE_YOU: DialogId = DialogId::from_static("nice_to_see_you");
pub const SURE_GO_AHEAD: DialogId = DialogId::from_static("sure_go_ahead");
pub const SURE_LETS_SKIP_IT: DialogId = DialogId::from_static("sure_lets_skip_it");
pub const OK: DialogId = DialogId::from_static("ok");
pub const BEFORE_THAT_I_SAID: DialogId = DialogId::from_static("before_that_i_said");
pub const I_DIDNT_SAY_ANYTHING_BEFORE_THAT: DialogId = DialogId::from_static("i_didnt_say_anything_before_that");
pub const YES: DialogId = DialogId::from_static("yes");
pub const IM_FINE: DialogId = DialogId::from_static("im_fine");
pub const YOU_ARE_ALLOWED_TO_THINK: DialogId = DialogId::from_static("you_are_allowed_to_think");
pub const YES_IM_HERE: DialogId = DialogId::from_static("yes_im_here");
