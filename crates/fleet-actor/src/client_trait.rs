use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Trait for store-specific clients to inherit the common read operations.
///
/// A domain client (e.g. `OrderClient`) wraps a [`ResourceClient`], names its own error type
/// and says how framework errors map onto it; `get` and `list` then come for free.
///
/// # Example
///
/// ```rust
/// use fleet_actor::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)]
/// struct Depot { id: u32 }
/// #[derive(Debug)] enum DepotAction {}
/// #[derive(Debug)] struct DepotError(String);
///
/// impl std::fmt::Display for DepotError {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "{}", self.0)
///     }
/// }
/// impl std::error::Error for DepotError {}
/// impl From<String> for DepotError {
///     fn from(s: String) -> Self { DepotError(s) }
/// }
///
/// #[async_trait]
/// impl ActorEntity for Depot {
///     type Id = u32;
///     type Create = ();
///     type Update = ();
///     type Action = DepotAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = DepotError;
///
///     fn from_create_params(seq: u64, _: ()) -> Result<Self, Self::Error> {
///         Ok(Self { id: seq as u32 })
///     }
///     fn id(&self) -> &u32 { &self.id }
///     async fn on_update(&mut self, _: (), _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: DepotAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
/// }
///
/// struct DepotClient {
///     inner: ResourceClient<Depot>,
/// }
///
/// #[async_trait]
/// impl ActorClient<Depot> for DepotClient {
///     type Error = DepotError;
///
///     fn inner(&self) -> &ResourceClient<Depot> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         DepotError(e.to_string())
///     }
/// }
///
/// async fn usage(client: DepotClient) {
///     let _ = client.get(1).await;
///     let _ = client.list().await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The store-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific store error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch a record by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Fetch every record in insertion order.
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list().await.map_err(Self::map_error)
    }
}
