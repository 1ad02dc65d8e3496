use crate::{
    Error,
    error::{TemporalViolation, ValidationError},
    kpi::KpiFilter,
    objective::{
        IndicatorProgress, NewObjectif, Objectif, ObjectifInput, ObjectiveFilter,
        ObjectiveProgress, ObjectiveTargets,
    },
    period::ObjectiveWindow,
    repositories::{KpiRepository, ObjectiveRepository},
    services::{deleted, found},
    validation::{optional_text, parse_date, require_non_negative_amount, require_non_negative_count},
};
use chrono::{Datelike, Local, NaiveDate};
use std::sync::Arc;

/// Service for objectives and their progress against recorded KPIs
pub struct ObjectiveService<O: ObjectiveRepository, K: KpiRepository> {
    objectives: Arc<O>,
    kpis: Arc<K>,
    window: ObjectiveWindow,
}

impl<O: ObjectiveRepository, K: KpiRepository> ObjectiveService<O, K> {
    pub fn new(objectives: Arc<O>, kpis: Arc<K>) -> Self {
        Self {
            objectives,
            kpis,
            window: ObjectiveWindow::default(),
        }
    }

    pub fn with_window(mut self, window: ObjectiveWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> ObjectiveWindow {
        self.window
    }

    pub async fn list(&self, filter: &ObjectiveFilter) -> Result<Vec<Objectif>, Error> {
        validate_filter(filter)?;
        self.objectives.list(filter).await
    }

    pub async fn get(&self, id: i64) -> Result<Objectif, Error> {
        found(self.objectives.find_by_id(id).await?)
    }

    pub async fn create(&self, input: &ObjectifInput) -> Result<Objectif, Error> {
        self.create_at(input, today()).await
    }

    /// Create an objective, validating its period against `today`.
    pub async fn create_at(
        &self,
        input: &ObjectifInput,
        today: NaiveDate,
    ) -> Result<Objectif, Error> {
        let objective = self.prepare(input, today)?;
        let created = self.objectives.create(&objective).await?;
        tracing::info!(
            objective_id = created.id,
            agence_id = created.agence_id,
            "Objective created"
        );
        Ok(created)
    }

    pub async fn update(&self, id: i64, input: &ObjectifInput) -> Result<Objectif, Error> {
        self.update_at(id, input, today()).await
    }

    pub async fn update_at(
        &self,
        id: i64,
        input: &ObjectifInput,
        today: NaiveDate,
    ) -> Result<Objectif, Error> {
        let objective = self.prepare(input, today)?;
        found(self.objectives.update(id, &objective).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        deleted(self.objectives.delete(id).await?)
    }

    /// Compare an objective's targets with the KPIs recorded over its period.
    pub async fn progress(&self, id: i64) -> Result<ObjectiveProgress, Error> {
        let objectif = self.get(id).await?;

        let filter = KpiFilter {
            agence_id: Some(objectif.agence_id),
            date_debut: Some(objectif.date_debut),
            date_fin: Some(objectif.date_fin),
            code_type: None,
        };
        let realised = self.kpis.summarize(&filter).await?.totals;
        let targets = objectif.targets;

        let indicateurs = vec![
            IndicatorProgress::new(
                "encaissement",
                targets.obj_encaissement,
                realised.encaissement_journalier_global,
            ),
            IndicatorProgress::new(
                "relances",
                targets.obj_relances as f64,
                realised.nb_relances_envoyees as f64,
            ),
            IndicatorProgress::new(
                "misesEnDemeure",
                targets.obj_mises_en_demeure as f64,
                realised.nb_mises_en_demeure_envoyees as f64,
            ),
            IndicatorProgress::new(
                "dossiersJuridiques",
                targets.obj_dossiers_juridiques as f64,
                realised.nb_dossiers_juridiques as f64,
            ),
            IndicatorProgress::new(
                "coupures",
                targets.obj_coupures as f64,
                realised.nb_coupures as f64,
            ),
        ];

        Ok(ObjectiveProgress {
            objectif,
            indicateurs,
        })
    }

    /// Shape validation first, then the temporal window on `dateDebut`.
    fn prepare(&self, input: &ObjectifInput, today: NaiveDate) -> Result<NewObjectif, Error> {
        let objective = normalize(input)?;

        let start = objective.date_debut;
        let check = self.window.validate(start.year(), start.month(), today);
        if !check.valid {
            tracing::debug!(errors = ?check.errors, "Objective outside the allowed window");
            return Err(Error::Temporal(TemporalViolation {
                errors: check.errors,
            }));
        }

        Ok(objective)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Years accepted by the `annee` filter.
const FILTER_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

fn validate_filter(filter: &ObjectiveFilter) -> Result<(), ValidationError> {
    if let Some(annee) = filter.annee {
        if !FILTER_YEARS.contains(&annee) {
            return Err(ValidationError::InvalidField(format!(
                "annee must be between 1 and 9999, got {annee}"
            )));
        }
    }
    if let Some(mois) = filter.mois {
        if !(1..=12).contains(&mois) {
            return Err(ValidationError::InvalidField(format!(
                "mois must be between 1 and 12, got {mois}"
            )));
        }
        if filter.annee.is_none() {
            return Err(ValidationError::MissingField("annee".to_string()));
        }
    }
    Ok(())
}

fn validate_targets(targets: &ObjectiveTargets) -> Result<(), ValidationError> {
    require_non_negative_amount("objEncaissement", targets.obj_encaissement)?;
    require_non_negative_count("objRelances", targets.obj_relances)?;
    require_non_negative_count("objMisesEnDemeure", targets.obj_mises_en_demeure)?;
    require_non_negative_count("objDossiersJuridiques", targets.obj_dossiers_juridiques)?;
    require_non_negative_count("objCoupures", targets.obj_coupures)
}

fn normalize(input: &ObjectifInput) -> Result<NewObjectif, ValidationError> {
    let agence_id = input
        .agence_id
        .ok_or_else(|| ValidationError::MissingField("agenceId".to_string()))?;

    let date_debut = parse_date("dateDebut", &input.date_debut)?;
    let date_fin = parse_date("dateFin", &input.date_fin)?;
    if date_fin < date_debut {
        return Err(ValidationError::InvalidDate(
            "dateFin must not be before dateDebut".to_string(),
        ));
    }

    validate_targets(&input.targets)?;

    Ok(NewObjectif {
        agence_id,
        titre: optional_text("titre", input.titre.as_deref(), 200)?,
        description: optional_text("description", input.description.as_deref(), 1000)?,
        date_debut,
        date_fin,
        targets: input.targets,
        cree_par: input.cree_par,
        est_actif: input.est_actif.unwrap_or(true),
    })
}
