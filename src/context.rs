use crate::auth::Authenticator;
use crate::cache::{Cache, CacheHandle, NoopCache, RedisCache};
use crate::config::Config;
use crate::database::{self, DbPool};
use crate::domains::attachment::{FileAttachmentManager, MySqlAttachmentRepository};
use crate::domains::audit::{AuditLogManager, MySqlAuditRepository};
use crate::domains::blacklist::{BlacklistManager, MySqlBlacklistRepository};
use crate::domains::entity::{EntitiesManager, MySqlEntityRepository};
use crate::domains::evidence::{EvidenceManager, MySqlEvidenceRepository};
use crate::domains::operator::{MySqlOperatorRepository, OperatorManager};
use crate::errors::DbError;
use crate::storage::{FileStorage, LocalFileStorage};
use std::sync::Arc;

/// Everything a handler needs, threaded explicitly instead of living behind
/// the teacher's process-wide singleton (spec.md §9).
pub struct AppContext {
    pub config: Config,
    pub pool: DbPool,
    pub cache: Arc<CacheHandle>,
    pub storage: Arc<dyn FileStorage>,
    pub authenticator: Arc<Authenticator>,
    pub operators: Arc<OperatorManager>,
    pub entities: Arc<EntitiesManager>,
    pub evidence: Arc<EvidenceManager>,
    pub attachments: Arc<FileAttachmentManager>,
    pub blacklist: Arc<BlacklistManager>,
    pub audit: Arc<AuditLogManager>,
}

impl AppContext {
    pub async fn new(config: Config) -> Result<Self, DbError> {
        let pool = database::connect(&config.database).await?;

        let cache_backend: Arc<dyn Cache> = if config.cache.enabled {
            match RedisCache::connect(&config.cache).await {
                Ok(redis) => Arc::new(redis),
                Err(e) => {
                    log::error!("failed to connect to redis, caching disabled for this process: {e}");
                    Arc::new(NoopCache)
                }
            }
        } else {
            Arc::new(NoopCache)
        };
        let cache = Arc::new(CacheHandle::new(cache_backend, config.cache.clone()));

        let storage = Arc::new(
            LocalFileStorage::new(&config.server.storage_path, config.server.max_items_per_kind as u64)
                .map_err(|e| DbError::Other(format!("failed to initialize storage directory: {e}")))?,
        );

        let audit = Arc::new(AuditLogManager::new(Arc::new(MySqlAuditRepository::new(pool.clone()))));

        let operators = Arc::new(OperatorManager::new(
            Arc::new(MySqlOperatorRepository::new(pool.clone())),
            cache.clone(),
            audit.clone(),
            config.server.api_key.clone(),
        ));

        let entities = Arc::new(EntitiesManager::new(Arc::new(MySqlEntityRepository::new(pool.clone()))));

        let evidence = Arc::new(EvidenceManager::new(
            Arc::new(MySqlEvidenceRepository::new(pool.clone())),
            entities.clone(),
            operators.clone(),
            audit.clone(),
        ));

        let attachments = Arc::new(FileAttachmentManager::new(
            Arc::new(MySqlAttachmentRepository::new(pool.clone())),
            storage.clone() as Arc<dyn FileStorage>,
            evidence.clone(),
            audit.clone(),
            config.server.max_upload_size,
        ));

        let blacklist = Arc::new(BlacklistManager::new(
            Arc::new(MySqlBlacklistRepository::new(pool.clone())),
            entities.clone(),
            evidence.clone(),
            audit.clone(),
            config.server.min_blacklist_time,
        ));

        let authenticator = Arc::new(Authenticator::new(operators.clone()));

        Ok(Self {
            config,
            pool,
            cache,
            storage,
            authenticator,
            operators,
            entities,
            evidence,
            attachments,
            blacklist,
            audit,
        })
    }
}
