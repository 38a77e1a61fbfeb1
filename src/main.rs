use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use tokio::sync::mpsc;

use statehouse::cli::{AuthCommand, Cli, Commands, CredentialsArgs, RecipesCommand, ShoppingCommand};
use statehouse::config::Config;
use statehouse::effects::register_effects;
use statehouse::features::api::http_client;
use statehouse::features::auth::actions::{
    types as auth_types, Credentials, AUTO_LOGIN, LOGIN_START, LOGOUT, SIGNUP_START,
};
use statehouse::features::auth::{
    self, auth_effects, select_auth_error, select_auth_token, select_auth_user, FileSessionStorage,
    HttpAuthApi, Navigator, SessionStorage,
};
use statehouse::features::recipes::actions::{types as recipe_types, FETCH_RECIPES};
use statehouse::features::recipes::{
    recipe_effects, select_recipes, select_recipes_error, HttpRecipeApi, RecipeApi,
};
use statehouse::features::root_reducers;
use statehouse::features::shopping_list::actions::{
    ADD_INGREDIENT, DELETE_INGREDIENT, START_EDIT, UPDATE_INGREDIENT,
};
use statehouse::features::shopping_list::{select_ingredients, Ingredient};
use statehouse::logging::init_tracing;
use statehouse::store::{Action, Store};

/// Forwards every route change so the CLI can wait on navigation.
struct ChannelNavigator(mpsc::UnboundedSender<String>);

impl Navigator for ChannelNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(route = %path, "Navigate");
        let _ = self.0.send(path.to_string());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    init_tracing(&config.logging.filter);

    let timeout = Duration::from_secs(config.effects.timeout_seconds);
    let state_path = config.storage.state_path.clone();

    let mut builder = Store::builder(root_reducers());
    if let Some(snapshot) = load_snapshot(&state_path)? {
        builder = builder.hydrate(snapshot);
    }
    let store = builder.build().context("Failed to build store")?;

    let client = http_client(timeout)?;
    let storage: Arc<dyn SessionStorage> =
        Arc::new(FileSessionStorage::new(&config.storage.session_path));
    let recipe_api: Arc<dyn RecipeApi> = Arc::new(
        HttpRecipeApi::new(client.clone(), &config.api.recipes_url)
            .with_token(store.select(select_auth_token())),
    );
    let auth_api = Arc::new(HttpAuthApi::new(
        client,
        &config.api.auth_url,
        &config.api.api_key,
    ));
    let (routes_tx, mut routes) = mpsc::unbounded_channel();

    let mut effects = auth_effects(
        auth_api,
        Arc::clone(&storage),
        Arc::new(ChannelNavigator(routes_tx)),
    );
    effects.extend(recipe_effects(Arc::clone(&recipe_api)));
    let runtime = register_effects(&store, effects);

    restore_session(&store, storage.as_ref(), timeout).await?;

    match cli.command {
        Commands::State => {
            let tree = store.state().to_json()?;
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Commands::Shopping(command) => shopping(&store, command)?,
        Commands::Recipes(RecipesCommand::List) => {
            for (index, recipe) in store.select(select_recipes()).get()?.iter().enumerate() {
                println!("{index}: {} ({} ingredients)", recipe.name, recipe.ingredients.len());
            }
        }
        Commands::Recipes(RecipesCommand::Fetch) => {
            let done = dispatch_and_wait(
                &store,
                FETCH_RECIPES.empty(),
                &[recipe_types::SET_RECIPES, recipe_types::FETCH_RECIPES_FAIL],
                timeout,
            )
            .await?;
            if done.kind() == recipe_types::FETCH_RECIPES_FAIL {
                let error = store.select(select_recipes_error()).get()?;
                bail!("Fetching recipes failed: {}", error.as_deref().unwrap_or("unknown error"));
            }
            println!("Fetched {} recipes", store.select(select_recipes()).get()?.len());
        }
        Commands::Recipes(RecipesCommand::Save) => {
            let recipes = store.select(select_recipes()).get()?;
            tokio::time::timeout(timeout, recipe_api.store(&recipes))
                .await
                .context("Timed out storing recipes")??;
            println!("Stored {} recipes", recipes.len());
        }
        Commands::Auth(AuthCommand::Login(args)) => {
            authenticate(&store, LOGIN_START.create(credentials(args))?, timeout).await?
        }
        Commands::Auth(AuthCommand::Signup(args)) => {
            authenticate(&store, SIGNUP_START.create(credentials(args))?, timeout).await?
        }
        Commands::Auth(AuthCommand::Logout) => {
            store.dispatch(LOGOUT.empty())?;
            wait_for_route(&mut routes, "/auth", timeout).await?;
            println!("Signed out");
        }
        Commands::Auth(AuthCommand::Status) => match &*store.select(select_auth_user()).get()? {
            Some(user) => println!(
                "Signed in as {} until {}",
                user.email,
                user.token_expiration_date.to_rfc3339()
            ),
            None => println!("Not signed in"),
        },
    }

    runtime.shutdown().await;
    save_snapshot(&store, &state_path)
}

fn credentials(args: CredentialsArgs) -> Credentials {
    Credentials::new(args.email, args.password)
}

fn shopping(store: &Store, command: ShoppingCommand) -> Result<()> {
    match command {
        ShoppingCommand::List => {}
        ShoppingCommand::Add { name, amount } => {
            store.dispatch(ADD_INGREDIENT.create(Ingredient::new(name, amount))?)?
        }
        ShoppingCommand::Edit {
            index,
            name,
            amount,
        } => {
            store.dispatch(START_EDIT.create(index)?)?;
            store.dispatch(UPDATE_INGREDIENT.create(Ingredient::new(name, amount))?)?;
        }
        ShoppingCommand::Delete { index } => {
            store.dispatch(START_EDIT.create(index)?)?;
            store.dispatch(DELETE_INGREDIENT.empty())?;
        }
    }
    for (index, ingredient) in store.select(select_ingredients()).get()?.iter().enumerate() {
        println!("{index}: {} x{}", ingredient.name, ingredient.amount);
    }
    Ok(())
}

async fn authenticate(store: &Store, start: Action, timeout: Duration) -> Result<()> {
    let done = dispatch_and_wait(
        store,
        start,
        &[auth_types::AUTHENTICATE_SUCCESS, auth_types::AUTHENTICATE_FAIL],
        timeout,
    )
    .await?;
    if done.kind() == auth_types::AUTHENTICATE_FAIL {
        let error = store.select(select_auth_error()).get()?;
        bail!("{}", error.as_deref().unwrap_or("Authentication failed"));
    }
    if let Some(user) = &*store.select(select_auth_user()).get()? {
        println!("Signed in as {}", user.email);
    }
    Ok(())
}

/// Dispatch `AUTO_LOGIN`, waiting for the restored session when one is stored.
async fn restore_session(store: &Store, storage: &dyn SessionStorage, timeout: Duration) -> Result<()> {
    let stored = match storage.load() {
        Ok(user) => user.is_some_and(|user| user.token().is_some()),
        Err(error) => {
            tracing::warn!(error = %error, "Ignoring unreadable session");
            false
        }
    };
    if stored {
        dispatch_and_wait(
            store,
            AUTO_LOGIN.empty(),
            &[auth_types::AUTHENTICATE_SUCCESS],
            timeout,
        )
        .await?;
    } else {
        store.dispatch(AUTO_LOGIN.empty())?;
    }
    Ok(())
}

/// Dispatch `action` and wait for the first action whose type is in `until`.
async fn dispatch_and_wait(
    store: &Store,
    action: Action,
    until: &[&str],
    timeout: Duration,
) -> Result<Action> {
    let mut actions = store.actions();
    store.dispatch(action)?;
    let waited = tokio::time::timeout(timeout, async {
        while let Some(dispatched) = actions.recv().await {
            if until.contains(&dispatched.action.kind()) {
                return Some(dispatched.action);
            }
        }
        None
    })
    .await
    .with_context(|| format!("Timed out waiting for {until:?}"))?;
    waited.ok_or_else(|| anyhow!("Store closed while waiting for {until:?}"))
}

async fn wait_for_route(
    routes: &mut mpsc::UnboundedReceiver<String>,
    target: &str,
    timeout: Duration,
) -> Result<()> {
    tokio::time::timeout(timeout, async {
        while let Some(route) = routes.recv().await {
            if route == target {
                return Ok(());
            }
        }
        Err(anyhow!("Navigation closed before reaching {target}"))
    })
    .await
    .with_context(|| format!("Timed out waiting for navigation to {target}"))?
}

fn load_snapshot(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file '{}'", path.display()))?;
    let snapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse state file '{}'", path.display()))?;
    Ok(Some(snapshot))
}

/// Persist every slice except auth, whose source of truth is the session file.
fn save_snapshot(store: &Store, path: &Path) -> Result<()> {
    let mut snapshot = store.state().to_json()?;
    if let Some(slices) = snapshot.as_object_mut() {
        slices.remove(auth::FEATURE_KEY);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&snapshot)?)
        .with_context(|| format!("Failed to write state file '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), "State saved");
    Ok(())
}
