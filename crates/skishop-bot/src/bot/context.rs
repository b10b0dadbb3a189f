use skishop_core::catalog::CatalogStore;
use skishop_core::dialog::SessionStore;

use crate::media::MediaHost;
use crate::telegram::TelegramClient;

/// Shared state for message handling: the transport client, the operator
/// identity, the session store and the external stores.
pub struct BotContext {
    client: TelegramClient,
    operator_id: i64,
    sessions: SessionStore,
    catalog: CatalogStore,
    media_host: MediaHost,
}

impl BotContext {
    pub fn new(
        client: TelegramClient,
        operator_id: i64,
        catalog: CatalogStore,
        media_host: MediaHost,
    ) -> Self {
        Self {
            client,
            operator_id,
            sessions: SessionStore::new(),
            catalog,
            media_host,
        }
    }

    pub fn client(&self) -> &TelegramClient {
        &self.client
    }

    pub fn operator_id(&self) -> i64 {
        self.operator_id
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn media_host(&self) -> &MediaHost {
        &self.media_host
    }
}
