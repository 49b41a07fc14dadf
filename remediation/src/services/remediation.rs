use catalog::{CatalogClient, CatalogSource};
use common::config::Settings;
use common::models::{Column, PiiRule, QualityIssue};
use common::{Error, Result};
use notification::{ChangeBus, ConfigChange};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::classifier::{self, Classification};
use crate::dialect::Dialect;
use crate::rules::{RuleMatch, RuleMatcher};
use crate::synthesizer::{FixScript, FixScriptSynthesizer, comment_lines};

/// Shared state behind the HTTP API: settings, the cached PII rules, the
/// change bus and, when configured, the catalog backend.
pub struct RemediationService {
    settings: Settings,
    rules: RwLock<RuleMatcher>,
    bus: ChangeBus,
    catalog: Option<Arc<dyn CatalogSource>>,
}

impl RemediationService {
    pub fn new(settings: Settings, catalog: Option<Arc<dyn CatalogSource>>) -> Result<Self> {
        Ok(Self {
            settings,
            rules: RwLock::new(RuleMatcher::new(Vec::new())?),
            bus: ChangeBus::default(),
            catalog,
        })
    }

    /// Builds the service with a [`CatalogClient`] when `catalog.base_url`
    /// is set.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let catalog: Option<Arc<dyn CatalogSource>> = match settings.catalog.base_url {
            Some(_) => Some(Arc::new(CatalogClient::new(&settings.catalog)?)),
            None => None,
        };
        Self::new(settings, catalog)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    pub fn has_catalog(&self) -> bool {
        self.catalog.is_some()
    }

    /// Synthesizer for one asset; a missing dialect or schema falls back to
    /// the `synthesis` settings.
    pub fn synthesizer(
        &self,
        asset_name: &str,
        schema_name: Option<&str>,
        dialect: Option<&str>,
    ) -> Result<FixScriptSynthesizer> {
        let asset_name = asset_name.trim();
        if asset_name.is_empty() {
            return Err(Error::InvalidInput("asset_name must not be empty".into()));
        }

        let synthesis = &self.settings.synthesis;
        let dialect = dialect
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(&synthesis.default_dialect);
        let schema = schema_name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&synthesis.default_schema);

        Ok(FixScriptSynthesizer::new(
            asset_name,
            Some(schema),
            Dialect::detect(dialect),
        ))
    }

    /// Heuristic classification with the requirements of the matching
    /// enabled rule folded in.
    pub async fn classify(&self, column: &Column, issue: &QualityIssue) -> Classification {
        classify_with_rules(&*self.rules.read().await, column, issue)
    }

    pub async fn fix_script(
        &self,
        column: &Column,
        issue: &QualityIssue,
        asset_name: &str,
        schema_name: Option<&str>,
        dialect: Option<&str>,
    ) -> Result<FixScript> {
        let synth = self.synthesizer(asset_name, schema_name, dialect)?;
        if issue.supplied_fix_script().is_some() {
            return Ok(synth.resolve(column, issue));
        }

        let classification = self.classify(column, issue).await;
        Ok(synth.synthesize_classified(column, issue, &classification))
    }

    /// Same scripts as [`fix_script`](Self::fix_script) for every issue of
    /// every column, laid out as one batch.
    pub async fn batch_script(
        &self,
        columns: &[Column],
        asset_name: &str,
        schema_name: Option<&str>,
        dialect: Option<&str>,
    ) -> Result<String> {
        let synth = self.synthesizer(asset_name, schema_name, dialect)?;
        let rules = self.rules.read().await;
        Ok(synth.batch_with(columns, |column, issue| {
            if issue.supplied_fix_script().is_some() {
                return synth.resolve(column, issue);
            }
            let classification = classify_with_rules(&rules, column, issue);
            synth.synthesize_classified(column, issue, &classification)
        }))
    }

    /// Fetches an asset's columns from the catalog and renders the batch
    /// script for them. The asset's own schema is used unless one is given.
    pub async fn asset_batch_script(
        &self,
        asset_id: &str,
        schema_name: Option<&str>,
        dialect: Option<&str>,
    ) -> Result<String> {
        let catalog = self.catalog()?;
        let assets = catalog.list_assets().await?;
        let asset = assets
            .iter()
            .find(|a| a.id.as_deref() == Some(asset_id))
            .ok_or_else(|| Error::NotFound(format!("asset '{}'", asset_id)))?;

        let columns = catalog.asset_columns(asset_id).await?;
        let quality = asset.quality_score_label();
        info!(asset = %asset.name, columns = columns.len(), quality = %quality, "Fetched asset columns");

        let schema = schema_name.or(asset.schema.as_deref());
        let script = self
            .batch_script(&columns, asset.table_name(), schema, dialect)
            .await?;

        let mut out = comment_lines(&format!("Catalog asset {}: quality score {}", asset.name, quality));
        out.push(script);
        Ok(out.join("\n"))
    }

    pub async fn rule_matches(&self, column: &Column) -> Vec<RuleMatch> {
        self.rules.read().await.match_column(column)
    }

    pub async fn rule_count(&self) -> usize {
        self.rules.read().await.len()
    }

    /// Replaces the cached rule set. Nothing changes if any pattern fails to
    /// compile.
    pub async fn set_rules(&self, rules: Vec<PiiRule>) -> Result<usize> {
        let matcher = RuleMatcher::new(rules)?;
        if matcher.is_empty() {
            warn!("PII rule set is empty; classifications carry no rule requirements");
        }
        let count = matcher.len();
        *self.rules.write().await = matcher;
        Ok(count)
    }

    pub async fn reload_rules(&self) -> Result<usize> {
        let rules = self.catalog()?.pii_rules().await?;
        let count = self.set_rules(rules).await?;
        info!(rules = count, "Reloaded PII rules");
        Ok(count)
    }

    /// Publishes a local change, or relays one versioned elsewhere when
    /// `version` is given.
    pub fn publish_change(&self, source: &str, version: Option<u64>) -> Result<ConfigChange> {
        let source = source.trim();
        if source.is_empty() {
            return Err(Error::InvalidInput("source must not be empty".into()));
        }

        match version {
            Some(0) => Err(Error::InvalidInput("version must be greater than zero".into())),
            Some(version) => {
                let change = ConfigChange::new(version, source);
                self.bus.relay(change.clone());
                Ok(change)
            }
            None => Ok(self.bus.publish(source)),
        }
    }

    /// Checks a rule edit, or a deletion when `proposed` is `None`, against
    /// the system-rule invariants. An edit must also compile.
    pub fn validate_rule_edit(&self, current: &PiiRule, proposed: Option<&PiiRule>) -> Result<()> {
        match proposed {
            Some(proposed) => {
                current.validate_update(proposed)?;
                RuleMatcher::new(vec![proposed.clone()]).map(|_| ())
            }
            None => current.validate_delete(),
        }
    }

    /// Applies a "not PII" decision to a column: its PII tag, sensitivity
    /// flag and PII issues are dropped.
    pub fn clear_pii(&self, mut column: Column) -> Column {
        info!(column = %column.column_name, "Clearing PII marking");
        column.clear_pii();
        column
    }

    /// Reloads the rules from the catalog on every change published on the
    /// bus. Returns `None` when no catalog is configured.
    pub fn spawn_rule_refresher(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.catalog.is_none() {
            return None;
        }

        let mut listener = self.bus.subscribe();
        let service = Arc::clone(self);
        Some(tokio::spawn(async move {
            while let Some(change) = listener.next_change().await {
                info!(version = change.version, source = %change.source, "PII config changed");
                if let Err(e) = service.reload_rules().await {
                    error!(error = %e, version = change.version, "Failed to reload PII rules");
                }
            }
            warn!("Change bus closed; rule refresher stopped");
        }))
    }

    fn catalog(&self) -> Result<&Arc<dyn CatalogSource>> {
        self.catalog
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("catalog.base_url is not configured".into()))
    }
}

fn classify_with_rules(rules: &RuleMatcher, column: &Column, issue: &QualityIssue) -> Classification {
    let classification = classifier::classify(column, issue);
    if !classification.is_pii_issue {
        return classification;
    }

    match rules.rule_for(classification.pii_type.as_str()) {
        Some(rule) => classification.with_rule(rule),
        None => classification,
    }
}
