use ade::{
    Ade, AdeBuilder, AgenceInput, CentreInput, CategorieInput, KpiFilter, KpiInput, KpiMeasures,
    LoginOutcome, ObjectifInput, ObjectiveTargets, Role, SqliteRepositoryProvider,
    UtilisateurInput,
};
use chrono::NaiveDate;

async fn setup() -> Ade<SqliteRepositoryProvider> {
    AdeBuilder::new()
        .with_sqlite("sqlite::memory:")
        .await
        .expect("Failed to connect")
        .apply_migrations(true)
        .build()
        .await
        .expect("Failed to build")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Creates a centre, an agence and the ORD category; returns the agence id.
async fn seed_reference_data(ade: &Ade<SqliteRepositoryProvider>) -> i64 {
    let centre = ade
        .centres()
        .create(&CentreInput {
            nom_centre: "Centre Alger Est".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let agence = ade
        .agences()
        .create(&AgenceInput {
            nom_agence: "Agence Bab Ezzouar".to_string(),
            centre_id: Some(centre.id),
            email: Some("bab-ezzouar@ade.dz".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    ade.categories()
        .create(&CategorieInput {
            code_type: "ORD".to_string(),
            libelle: "Ordinaire".to_string(),
        })
        .await
        .unwrap();

    agence.id
}

#[tokio::test]
async fn test_login_flow_blocks_after_three_failures() {
    let ade = setup().await;
    ade.bootstrap_admin("admin", "secret123").await.unwrap();

    let outcome = ade.login("10.0.0.1", "admin", "wrong").await.unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::Rejected {
            remaining_attempts: 2
        }
    );
    ade.login("10.0.0.1", "admin", "wrong").await.unwrap();

    let outcome = ade.login("10.0.0.1", "admin", "wrong").await.unwrap();
    assert!(matches!(outcome, LoginOutcome::Blocked { retry_after_seconds } if retry_after_seconds > 0));

    // Correct credentials are refused while the address is blocked
    let outcome = ade.login("10.0.0.1", "admin", "secret123").await.unwrap();
    assert!(matches!(outcome, LoginOutcome::Blocked { .. }));

    // Other addresses are unaffected
    let outcome = ade.login("10.0.0.2", "admin", "secret123").await.unwrap();
    let LoginOutcome::Success(user) = outcome else {
        panic!("Expected a successful login, got {outcome:?}");
    };
    assert_eq!(user.role, Role::Admin);

    let user = ade.users().get(user.id).await.unwrap();
    assert!(user.derniere_connexion.is_some());
}

#[tokio::test]
async fn test_successful_login_clears_failures() {
    let ade = setup().await;
    ade.bootstrap_admin("admin", "secret123").await.unwrap();

    ade.login("10.0.0.1", "admin", "wrong").await.unwrap();
    ade.login("10.0.0.1", "admin", "wrong").await.unwrap();
    assert_eq!(ade.limiter().attempts("10.0.0.1"), 2);

    let outcome = ade.login("10.0.0.1", "admin", "secret123").await.unwrap();
    assert!(matches!(outcome, LoginOutcome::Success(_)));
    assert_eq!(ade.limiter().attempts("10.0.0.1"), 0);
}

#[tokio::test]
async fn test_inactive_user_counts_as_failure() {
    let ade = setup().await;
    let agence_id = seed_reference_data(&ade).await;

    ade.users()
        .create(&UtilisateurInput {
            nom_utilisateur: "karim".to_string(),
            email: None,
            role: Role::Standard,
            agence_id: Some(agence_id),
            actif: Some(false),
            mot_de_passe: Some("motdepasse".to_string()),
        })
        .await
        .unwrap();

    let outcome = ade.login("10.0.0.3", "karim", "motdepasse").await.unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::Rejected {
            remaining_attempts: 2
        }
    );
}

#[tokio::test]
async fn test_bootstrap_admin_only_on_empty_table() {
    let ade = setup().await;

    let created = ade.bootstrap_admin("admin", "secret123").await.unwrap();
    assert!(created.is_some());

    let again = ade.bootstrap_admin("other", "secret123").await.unwrap();
    assert!(again.is_none());
    assert_eq!(ade.users().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reference_data_constraints() {
    let ade = setup().await;
    let agence_id = seed_reference_data(&ade).await;
    let agence = ade.agences().get(agence_id).await.unwrap();

    let err = ade.centres().delete(agence.centre_id).await.unwrap_err();
    assert!(err.is_constraint_violation());

    let counts = ade.centres().agence_counts().await.unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].nombre_agences, 1);

    let err = ade.agences().get(agence_id + 100).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_objective_window_and_progress() {
    let ade = setup().await;
    let agence_id = seed_reference_data(&ade).await;
    let today = date(2025, 6, 15);

    let input = ObjectifInput {
        agence_id: Some(agence_id),
        titre: Some("Objectif juin".to_string()),
        date_debut: "2025-06-01".to_string(),
        date_fin: "2025-06-30".to_string(),
        targets: ObjectiveTargets {
            obj_encaissement: 1_000.0,
            obj_relances: 40,
            obj_coupures: 0,
            ..Default::default()
        },
        ..Default::default()
    };
    let objective = ade.objectives().create_at(&input, today).await.unwrap();
    assert!(objective.est_actif);

    let too_early = ObjectifInput {
        date_debut: "2025-02-01".to_string(),
        date_fin: "2025-02-28".to_string(),
        ..input.clone()
    };
    let err = ade
        .objectives()
        .create_at(&too_early, today)
        .await
        .unwrap_err();
    assert!(matches!(err, ade::Error::Temporal(ref v) if v.errors.len() == 1));

    for (day, relances, encaissement) in [("2025-06-02", 10, 250.0), ("2025-06-03", 20, 250.0)] {
        ade.kpis()
            .create_at(
                &KpiInput {
                    date_kpi: day.to_string(),
                    agence_id: Some(agence_id),
                    code_type: "ORD".to_string(),
                    measures: KpiMeasures {
                        nb_relances_envoyees: relances,
                        encaissement_journalier_global: encaissement,
                        ..Default::default()
                    },
                },
                today,
            )
            .await
            .unwrap();
    }

    let progress = ade.objectives().progress(objective.id).await.unwrap();
    let relances = progress
        .indicateurs
        .iter()
        .find(|i| i.indicateur == "relances")
        .unwrap();
    assert_eq!(relances.realise, 30.0);
    assert_eq!(relances.taux_realisation, Some(75.0));

    let encaissement = progress
        .indicateurs
        .iter()
        .find(|i| i.indicateur == "encaissement")
        .unwrap();
    assert_eq!(encaissement.taux_realisation, Some(50.0));

    let coupures = progress
        .indicateurs
        .iter()
        .find(|i| i.indicateur == "coupures")
        .unwrap();
    assert_eq!(coupures.taux_realisation, None);
}

#[tokio::test]
async fn test_kpi_duplicate_and_summary() {
    let ade = setup().await;
    let agence_id = seed_reference_data(&ade).await;
    let today = date(2025, 6, 15);

    let input = KpiInput {
        date_kpi: "2025-06-10".to_string(),
        agence_id: Some(agence_id),
        code_type: "ORD".to_string(),
        measures: KpiMeasures {
            nb_coupures: 4,
            mt_coupures: 12_500.0,
            ..Default::default()
        },
    };
    let record = ade.kpis().create_at(&input, today).await.unwrap();

    let err = ade.kpis().create_at(&input, today).await.unwrap_err();
    assert!(err.is_constraint_violation());

    let future = KpiInput {
        date_kpi: "2025-06-16".to_string(),
        ..input.clone()
    };
    let err = ade.kpis().create_at(&future, today).await.unwrap_err();
    assert!(err.is_validation_error());

    let summary = ade
        .kpis()
        .summary(&KpiFilter {
            agence_id: Some(agence_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(summary.nombre_lignes, 1);
    assert_eq!(summary.totals.nb_coupures, 4);

    ade.kpis().delete(&record.key).await.unwrap();
    assert!(ade.kpis().get(&record.key).await.unwrap_err().is_not_found());
}
