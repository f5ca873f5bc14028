use dragon_addons::addons::AddonExport;
use dragon_addons::lazy::{BoxError, InjectGate, LazyCatalog, LazyRegistry, LibraryValue, LoadFn, LoadedLibraries};
use dragon_addons::{generate, write_loader, AddonCatalog, AddonSettings, AppContext, ModuleLoader, Settings};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn library(name: &'static str) -> LoadFn<impl Fn() -> std::future::Ready<Result<LibraryValue, BoxError>>> {
    LoadFn::new(move || std::future::ready(Ok(LibraryValue::new(name))))
}

fn append(tag: &'static str) -> AddonExport<Value> {
    AddonExport::transform(move |mut config: Value| {
        config["applied"].as_array_mut()?.push(json!(tag));
        Some(config)
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), dragon_addons::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings: AddonSettings = Settings::builder()
        .with_file("demos/addons.toml", true)
        .with_env("DRAGON", "__")
        .build()?;

    let catalog = LazyCatalog::new()
        .with_loadable("prettier", library("prettier"))
        .with_loadable("diff", library("diff"))
        .with_loadable("d3", library("d3"))
        .with_bundles(settings.lazy_bundles.clone());

    let ctx = AppContext::builder()
        .with_config(settings)
        .with_registry(LazyRegistry::new(catalog))
        .build()?;

    let path = write_loader(&ctx.config().addons, &ctx.config().loader)?;
    println!("Loader written to {}", path.display());

    let mut addons = AddonCatalog::new();
    addons
        .register("@plone/volto-slate", append("slate"))
        .register("volto-tabs", append("tabs"));
    addons
        .register_export("@plone/volto-slate", "asDefault", append("slate.asDefault"))?
        .register_export("@plone/volto-slate", "minimal", append("slate.minimal"))?;

    let module = generate(&ctx.config().addons)?;
    let config = addons.load_module(&module)?.load(json!({ "applied": [] }))?;
    println!("Composed configuration: {config}");

    let mut editor = InjectGate::mount(ctx.registry(), "editor", |title: &str, libs: LoadedLibraries| {
        format!("{title} with {}", libs.names().collect::<Vec<_>>().join(" + "))
    })?;
    println!("Editor gate: {}", editor.activate("Editor").await?);

    Ok(())
}
