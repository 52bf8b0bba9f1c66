//! Rule catalogs.
//!
//! A catalog is plain data fed to [`Registry::register`](crate::Registry::register):
//! the engine knows nothing about any particular rule.

pub mod companion {
    //! Small-talk and flow-control reactions for a companion agent.
    //!
    //! Everything the reactions do goes through a [`Voice`]; install the
    //! catalog with [`install`].

    pub mod keys;
    mod rules;
    mod voice;

    #[cfg(test)]
    mod tests;

    pub use rules::{SKIPPABLE_ACTIONS, install};
    pub use voice::{Finished, Transcript, Voice, VoiceEvent};
}
