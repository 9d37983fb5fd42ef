//! Admin commands.
//!
//! Every invocation authenticates from scratch: with `--token`, with
//! `--email`/`--password` against the backend login, or with the shared
//! password (`--password`, falling back to `HERBAL_ADMIN_PASSWORD`).

use anyhow::{Context, Result, bail};
use hb_api_types::ProductId;
use hb_auth_adapter::{AdminSession, ImageUpload, ProductForm};
use hb_catalog_client::AdminCredential;
use std::fs;

use crate::config::StorefrontConfig;
use crate::{AdminAuth, App, ProductArgs};

pub async fn authenticate(
    app: &mut App,
    auth: &AdminAuth,
    config: &StorefrontConfig,
) -> Result<()> {
    if let Some(token) = &auth.token {
        app.admin_mut().login_with_token(token)?;
        return Ok(());
    }

    if let Some(email) = &auth.email {
        let Some(password) = &auth.password else {
            bail!("--email needs --password");
        };
        app.admin_login(email, password).await?;
        return Ok(());
    }

    let expected = config.admin_password.as_deref().map(String::as_str);
    let candidate = auth.password.as_deref().or(expected).unwrap_or_default();
    app.admin_mut().login_with_password(candidate, expected)?;
    Ok(())
}

pub fn report_login(app: &mut App, auth: &AdminAuth) {
    match bearer_token(app.admin_mut()) {
        Some(token) if auth.email.is_some() => {
            println!("admin login ok; reuse the session with --token");
            println!("{token}");
        }
        _ => println!("admin login ok"),
    }
}

fn bearer_token(session: &mut AdminSession) -> Option<String> {
    match session.credential().ok()? {
        AdminCredential::Bearer { token, .. } => Some(token.as_str().to_owned()),
        AdminCredential::SharedPassword(_) => None,
    }
}

fn apply_args(form: &mut ProductForm, args: &ProductArgs) -> Result<()> {
    if let Some(name) = &args.name {
        form.name = name.clone();
    }
    if let Some(category) = &args.category {
        form.category = category.clone();
        form.new_category.clear();
    }
    if let Some(new_category) = &args.new_category {
        form.new_category = new_category.clone();
    }
    if let Some(price) = &args.price {
        form.price = price.clone();
    }
    if let Some(image_url) = &args.image_url {
        form.image_url = image_url.clone();
        form.retained_image = None;
    }
    if let Some(path) = &args.image_file {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read image {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        form.image_upload = Some(ImageUpload::from_file_name(&file_name, bytes));
    }
    if let Some(details) = &args.details {
        form.details = details.clone();
    }
    Ok(())
}

pub async fn create(app: &mut App, args: &ProductArgs) -> Result<()> {
    let mut form = ProductForm::default();
    apply_args(&mut form, args)?;
    let id = app.submit_product(&form).await?;
    println!("created product {id}");
    Ok(())
}

pub async fn update(app: &mut App, id: &ProductId, args: &ProductArgs) -> Result<()> {
    let mut form = app.edit_form(id)?;
    apply_args(&mut form, args)?;
    app.submit_product(&form).await?;
    println!("updated product {id}");
    Ok(())
}

pub async fn delete(app: &mut App, id: &ProductId) -> Result<()> {
    app.delete_product(id).await?;
    println!("deleted product {id}");
    Ok(())
}
