#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

#[macro_export]
macro_rules! re {
    ($pat:literal) => {
        $crate::Pattern::regex($crate::regex!($pat).clone())
    };
}

#[macro_export]
macro_rules! words {
    ($phrase:expr) => {
        $crate::Pattern::words($phrase)
    };
}

/// Declare a [`Reaction`](crate::Reaction).
///
/// ```
/// use interject::{Classification, ResumeDirective, reaction, words};
///
/// let hello = reaction! {
///     name: "hello back",
///     patterns: [words!("hello").final_only(), words!("hi")],
///     exclusions: [words!("hi fi")],
///     classification: Classification::Custom,
///     handler: |resume| resume.resume(ResumeDirective::ContinueExistingTrain),
/// };
/// assert_eq!(hello.name(), "hello back");
/// ```
#[macro_export]
macro_rules! reaction {
    (
        name: $name:expr,
        patterns: [ $($pat:expr),* $(,)? ]
        $(, exclusions: [ $($ex:expr),* $(,)? ])?
        $(, classification: $class:expr)?
        $(, precondition: $pre:expr)?
        , handler: $handler:expr
        $(,)?
    ) => {{
        let builder = $crate::Reaction::builder($name).patterns(vec![ $($pat),* ]);
        $( let builder = builder.exclusions(vec![ $($ex),* ]); )?
        $( let builder = builder.classification($class); )?
        $( let builder = builder.precondition($pre); )?
        builder.handler($handler)
    }};
}
