//! Job trait - ties a payload type to a name used in diagnostics.

use serde::de::DeserializeOwned;

/// A payload type a typed handler decodes from the queue item.
///
/// The reserved envelope keys (`id`, `attempts`) are part of the JSON too;
/// declare them on the type if the handler cares, otherwise serde ignores them.
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct SendMail { to: String }
///
/// impl Job for SendMail {
///     const NAME: &'static str = "mail.send";
/// }
/// ```
pub trait Job: DeserializeOwned + Send + Sync + 'static {
    const NAME: &'static str;
}
