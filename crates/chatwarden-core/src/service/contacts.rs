//! The contact tier service shared by message handlers.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::paths::StorePaths;
use crate::Result;
use crate::cache::{ContactCache, ContactInfo};
use crate::identity::Identity;
use crate::skip::{SkipList, SkipListStore};
use crate::templates::{TemplateSet, TemplateStore};
use crate::tier::{NewContactBehavior, Ruleset, RulesetStore, Tier, TierRule, TierSettings, TierStats};

/// The committed configuration. Replaced wholesale, never mutated in place.
#[derive(Debug, Clone)]
struct Snapshot {
    ruleset: Arc<Ruleset>,
    generation: u64,
    templates: Arc<TemplateSet>,
    skip_list: Arc<SkipList>,
}

/// Contact classification for message handlers.
///
/// Construct one with [`open`](Self::open) at startup and share it (usually in
/// an `Arc`) with every task that handles messages. Lookups are synchronous,
/// never touch the disk and can run concurrently with mutations: they always
/// see either the ruleset before a change or the one after it.
///
/// Mutations are staged on a copy of the ruleset, saved, and only then made
/// visible. If the save fails nothing changes, in memory or on disk.
#[derive(Debug)]
pub struct ContactTierService {
    ruleset_store: RulesetStore,
    template_store: TemplateStore,
    skip_store: SkipListStore,
    snapshot: RwLock<Snapshot>,
    cache: ContactCache,
    writer: Mutex<()>,
}

impl ContactTierService {
    /// Load (or bootstrap) all configuration files.
    ///
    /// # Errors
    ///
    /// Returns an error if any file is unreadable, not JSON, or invalid.
    pub async fn open(paths: StorePaths) -> Result<Self> {
        let ruleset_store = RulesetStore::new(paths.ruleset);
        let template_store = TemplateStore::new(paths.templates);
        let skip_store = SkipListStore::new(paths.skip_list);

        let snapshot = Snapshot {
            ruleset: Arc::new(ruleset_store.load().await?),
            generation: 0,
            templates: Arc::new(template_store.load().await?),
            skip_list: Arc::new(skip_store.load().await?),
        };
        info!(
            ruleset = %ruleset_store.path().display(),
            "Contact tier service ready"
        );

        Ok(Self {
            ruleset_store,
            template_store,
            skip_store,
            snapshot: RwLock::new(snapshot),
            cache: ContactCache::new(),
            writer: Mutex::new(()),
        })
    }

    /// Resolve a contact, using the cache when possible.
    #[must_use]
    pub fn contact_info(&self, name: &str, phone: Option<&str>) -> ContactInfo {
        let identity = Identity::new(name, phone);
        let Snapshot {
            ruleset,
            generation,
            ..
        } = self.snapshot();

        self.cache
            .get_or_resolve(&identity, generation, || ruleset.resolve(&identity))
    }

    /// Tier and settings for a contact.
    #[must_use]
    pub fn categorize(&self, name: &str, phone: Option<&str>) -> (Tier, TierSettings) {
        let info = self.contact_info(name, phone);
        (info.tier, info.settings)
    }

    /// Whether the contact gets any reply at all.
    #[must_use]
    pub fn should_reply(&self, name: &str, phone: Option<&str>) -> bool {
        self.categorize(name, phone).1.reply_mode.replies()
    }

    /// Whether a message from the contact should play a sound.
    #[must_use]
    pub fn should_notify(&self, name: &str, phone: Option<&str>) -> bool {
        self.categorize(name, phone).1.play_sound
    }

    /// Whether the chat should be opened and read.
    #[must_use]
    pub fn should_open_and_read(&self, name: &str, phone: Option<&str>) -> bool {
        self.categorize(name, phone).1.open_and_read
    }

    /// Whether the chat should be marked as read.
    #[must_use]
    pub fn should_mark_as_read(&self, name: &str, phone: Option<&str>) -> bool {
        self.categorize(name, phone).1.mark_as_read
    }

    /// Whether the contact matched no rule and got the default tier.
    #[must_use]
    pub fn is_uncategorized(&self, name: &str, phone: Option<&str>) -> bool {
        self.contact_info(name, phone).is_uncategorized()
    }

    /// The named template for the contact's tier, with `default` fallback.
    #[must_use]
    pub fn get_template(&self, name: &str, phone: Option<&str>, template_name: &str) -> String {
        let tier = self.contact_info(name, phone).tier;
        self.snapshot()
            .templates
            .get_template(tier, template_name)
            .to_string()
    }

    /// The AI system prompt for the contact's tier.
    #[must_use]
    pub fn get_ai_prompt(&self, name: &str, phone: Option<&str>) -> String {
        let tier = self.contact_info(name, phone).tier;
        self.snapshot().templates.get_ai_prompt(tier).to_string()
    }

    /// Add a contact's name and phone to a tier.
    ///
    /// Adding a contact that is already listed changes nothing and writes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the ruleset cannot be saved. The
    /// service then keeps serving the previous ruleset.
    pub async fn add_contact(&self, tier: Tier, name: &str, phone: Option<&str>) -> Result<()> {
        self.update_rule(tier, &Identity::new(name, phone), "add", TierRule::insert)
            .await
    }

    /// Remove a contact's name and phone from a tier. Absent entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the ruleset cannot be saved. The
    /// service then keeps serving the previous ruleset.
    pub async fn remove_contact(
        &self,
        tier: Tier,
        name: &str,
        phone: Option<&str>,
    ) -> Result<()> {
        self.update_rule(tier, &Identity::new(name, phone), "remove", TierRule::remove)
            .await
    }

    async fn update_rule(
        &self,
        tier: Tier,
        identity: &Identity,
        action: &'static str,
        apply: fn(&mut TierRule, &Identity) -> bool,
    ) -> Result<()> {
        if identity.name().is_empty() && identity.phone().is_none() {
            warn!(action, %tier, "Ignoring contact without name or phone");
            return Ok(());
        }

        let _writer = self.writer.lock().await;

        let mut staged = Ruleset::clone(&self.snapshot().ruleset);
        if !apply(staged.rule_mut(tier), identity) {
            debug!(action, %tier, key = %identity.cache_key(), "Ruleset unchanged");
            return Ok(());
        }

        self.ruleset_store.save(&staged).await?;
        let generation = self.commit(|snapshot| snapshot.ruleset = Arc::new(staged));
        self.cache.invalidate(identity);

        info!(action, %tier, key = %identity.cache_key(), generation, "Contact rules updated");
        Ok(())
    }

    /// Re-read every configuration file and drop all cached resolutions.
    ///
    /// # Errors
    ///
    /// Returns an error if any file fails to load; the current configuration
    /// stays in place.
    pub async fn reload(&self) -> Result<()> {
        let _writer = self.writer.lock().await;

        let ruleset = self.ruleset_store.load().await?;
        let templates = self.template_store.load().await?;
        let skip_list = self.skip_store.load().await?;

        let generation = self.commit(|snapshot| {
            snapshot.ruleset = Arc::new(ruleset);
            snapshot.templates = Arc::new(templates);
            snapshot.skip_list = Arc::new(skip_list);
        });
        self.cache.clear();

        info!(generation, "Configuration reloaded");
        Ok(())
    }

    /// Drop all cached resolutions.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of cached resolutions.
    #[must_use]
    pub fn cached_contacts(&self) -> usize {
        self.cache.len()
    }

    /// Number of ruleset changes committed since the service was opened.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }

    /// The current ruleset.
    #[must_use]
    pub fn ruleset(&self) -> Arc<Ruleset> {
        self.snapshot().ruleset
    }

    /// The current templates.
    #[must_use]
    pub fn templates(&self) -> Arc<TemplateSet> {
        self.snapshot().templates
    }

    /// Per-tier entry counts.
    #[must_use]
    pub fn tier_statistics(&self) -> BTreeMap<Tier, TierStats> {
        self.snapshot().ruleset.statistics()
    }

    /// What to do with contacts that match no rule.
    #[must_use]
    pub fn new_contact_behavior(&self) -> NewContactBehavior {
        self.snapshot().ruleset.defaults.new_contact_behavior
    }

    /// Whether the contact is on the skip list.
    #[must_use]
    pub fn is_skipped(&self, name: &str, phone: Option<&str>) -> bool {
        self.snapshot()
            .skip_list
            .is_contact_skipped(&Identity::new(name, phone))
    }

    /// Whether a group chat is on the skip list.
    #[must_use]
    pub fn is_group_skipped(&self, group: &str) -> bool {
        self.snapshot().skip_list.is_group_skipped(group)
    }

    /// The current skip list.
    #[must_use]
    pub fn skip_list(&self) -> Arc<SkipList> {
        self.snapshot().skip_list
    }

    /// Replace the skip list.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the list contains invalid phone numbers
    /// or blank names, and a configuration error if it cannot be saved. The
    /// current list stays in place on error.
    pub async fn update_skip_list(&self, skip_list: SkipList) -> Result<()> {
        let _writer = self.writer.lock().await;

        let skip_list = skip_list.normalized();
        self.skip_store.save(&skip_list).await?;
        self.commit(|snapshot| snapshot.skip_list = Arc::new(skip_list));

        info!("Skip list updated");
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Publish a new snapshot. Every commit starts a new generation, which
    /// retires all cached resolutions.
    fn commit(&self, change: impl FnOnce(&mut Snapshot)) -> u64 {
        let mut snapshot = self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        change(&mut snapshot);
        snapshot.generation += 1;
        snapshot.generation
    }
}
