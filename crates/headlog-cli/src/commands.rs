use anyhow::{Context, Result};
use chrono::Utc;
use tracing::debug;

use headlog_core::api::ApiError;
use headlog_core::auth::{self, CredentialStore, Route};
use headlog_core::models::{CatalogKind, Intensity, Location, NewHeadache};
use headlog_core::{ApiClient, Config};

use crate::{display, prompt, Command, NewArgs};

/// Load config, open the credential store, and run `command`
pub async fn run(command: Option<Command>) -> Result<()> {
    let mut config = Config::load().context("Failed to load config")?;
    let store = config.credential_store()?;
    let api = ApiClient::new(&config)?;
    debug!(base_url = api.base_url(), backend = ?config.credential_backend, "Client ready");

    match command {
        Some(Command::SignIn) => {
            prompt::sign_in(&api, store.as_ref(), &mut config).await?;
            Ok(())
        }
        Some(Command::SignOut) => {
            auth::sign_out(&api, store.as_ref())?;
            println!("Signed out.");
            Ok(())
        }
        command => {
            ensure_session(&api, store.as_ref(), &mut config).await?;
            dispatch(&api, &config, command.unwrap_or(Command::Stats)).await
        }
    }
}

/// Launch-time bootstrap, falling through to the sign-in prompt
async fn ensure_session(
    api: &ApiClient,
    store: &dyn CredentialStore,
    config: &mut Config,
) -> Result<()> {
    let state = auth::bootstrap(api, store).await;
    match state.route() {
        Some(Route::Main) => Ok(()),
        _ => {
            prompt::sign_in(api, store, config).await?;
            Ok(())
        }
    }
}

async fn dispatch(api: &ApiClient, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Stats => display::print_stats(&api.stats().await?),
        Command::Logs => display::print_log_list(&api.list_headaches().await?),
        Command::Show { id } => display::print_log(&api.headache(&id).await?),
        Command::Unended => match api.unended_headache().await? {
            Some(log) => display::print_log(&log),
            None => println!("No headache in progress."),
        },
        Command::New(args) => {
            let location = args.location().or(config.location);
            let entry = args.into_entry()?;
            api.create_headache(&entry, location).await?;
            println!("Headache logged.");
        }
        Command::End { id } => {
            api.end_headache(&id).await?;
            println!("You have successfully ended the headache.");
        }
        Command::Remedy {
            id,
            remedy_id,
            quantity,
        } => {
            api.add_remedy(&id, &remedy_id, quantity).await?;
            println!("You have successfully added a remedy.");
        }
        Command::Rate {
            id,
            headache_remedy_id,
            result,
        } => {
            api.rate_remedy(&id, &headache_remedy_id, result).await?;
            println!("Remedy rated {}.", result.symbol());
        }
        Command::Consumed { id, foods, drinks } => {
            let mut options = api.consumption_options(&id).await?;
            for food in &foods {
                options.current.toggle_food(food);
            }
            for drink in &drinks {
                options.current.toggle_drink(drink);
            }
            api.set_consumption(&id, &options.current).await?;
            display::print_selection("Foods", &options.foods, &options.current.foods);
            display::print_selection("Drinks", &options.drinks, &options.current.drinks);
        }
        Command::Foods { add } => catalog(api, CatalogKind::Foods, add).await?,
        Command::Drinks { add } => catalog(api, CatalogKind::Drinks, add).await?,
        Command::Remedies { add } => catalog(api, CatalogKind::Remedies, add).await?,
        Command::SignIn | Command::SignOut => {}
    }
    Ok(())
}

async fn catalog(api: &ApiClient, kind: CatalogKind, add: Option<String>) -> Result<()> {
    if let Some(name) = add {
        api.create_catalog_item(kind, &name).await?;
        println!("Added {}.", name.trim());
    }
    display::print_catalog(kind, &api.catalog(kind).await?);
    Ok(())
}

impl NewArgs {
    fn location(&self) -> Option<Location> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Location {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    fn into_entry(self) -> Result<NewHeadache> {
        let intensity = Intensity::try_from(self.intensity).map_err(ApiError::InvalidRequest)?;
        Ok(NewHeadache {
            start_timestamp: self.start.unwrap_or_else(Utc::now),
            end_timestamp: self.end,
            intensity,
            side: self.side,
            pressure_or_squeezing: self.pressure,
            throbbing_or_pulsating: self.throbbing,
            stabbing: self.stabbing,
            nausea_vomiting: self.nausea,
            light_sensitivity: self.light_sensitivity,
            noise_sensitivity: self.noise_sensitivity,
            sleep_rank: self.sleep_rank,
        })
    }
}
