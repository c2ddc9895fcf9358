//! SupplyChainSource trait implementation for the in-memory source.

use super::graph::neighbors_impl;
use super::InMemorySource;
use crate::domain::{Application, ApplicationId, SupplyChainSnapshot};
use crate::error::{Error, Result};
use crate::source::SupplyChainSource;
use async_trait::async_trait;
use petgraph::Direction;

#[async_trait]
impl SupplyChainSource for InMemorySource {
    async fn fetch_supply_chain(&self, id: &ApplicationId) -> Result<SupplyChainSnapshot> {
        let inner = self.inner.lock().await;

        let stored = inner
            .applications
            .get(id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;

        let upstream_apps = neighbors_impl(
            &inner.graph,
            &inner.node_map,
            &inner.applications,
            id,
            Direction::Incoming,
        )?;
        let downstream_apps = neighbors_impl(
            &inner.graph,
            &inner.node_map,
            &inner.applications,
            id,
            Direction::Outgoing,
        )?;

        Ok(SupplyChainSnapshot {
            main_app: Application::new(id.clone(), stored.name.clone()),
            upstream_apps,
            downstream_apps,
            main_details: (!stored.details.is_empty()).then(|| stored.details.clone()),
        })
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        let inner = self.inner.lock().await;

        let mut apps: Vec<Application> = inner
            .applications
            .iter()
            .map(|(id, stored)| Application::new(id.clone(), stored.name.clone()))
            .collect();
        apps.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        Ok(apps)
    }
}
