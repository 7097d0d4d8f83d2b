// Recipe book: a category list plus one sub-collection of recipes per category.

use serde::Deserialize;
use serde_json::json;

use crate::context::TenantContext;
use crate::db::{DbError, DocumentDb};
use crate::error::ServiceError;
use crate::paths::collections::{RECIPES, RECIPE_CATEGORIES_DOC};
use crate::paths::{CollectionRef, DocumentRef};
use crate::types::{decode_fixed, DocumentRecord, Recipe, RecipeCategories};

use super::{list_newest, require_text};

/// Input for [`add_recipe`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Category names become path segments.
pub(crate) fn is_usable_category(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && name != "." && name != ".."
}

fn require_category(category: &str) -> Result<String, ServiceError> {
    let category = require_text(category, "Category")?;
    if !is_usable_category(&category) {
        return Err(ServiceError::Validation(format!(
            "Invalid category name: {category:?}"
        )));
    }
    Ok(category)
}

fn recipes_in(ctx: &TenantContext, category: &str) -> Result<CollectionRef, ServiceError> {
    Ok(ctx.sub_collection(RECIPES, RECIPE_CATEGORIES_DOC, category)?)
}

/// Non-blank, trimmed lines.
fn clean_lines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn list_categories(db: &DocumentDb, ctx: &TenantContext) -> Result<Vec<String>, ServiceError> {
    let doc = ctx.document(RECIPES, RECIPE_CATEGORIES_DOC)?;
    let categories: RecipeCategories = decode_fixed(db.get_document(&doc)?)?;
    Ok(categories.names)
}

/// Add a category. Returns false when one with the same name (ignoring
/// case) already exists.
pub fn add_category(db: &DocumentDb, ctx: &TenantContext, name: &str) -> Result<bool, ServiceError> {
    let doc = ctx.document(RECIPES, RECIPE_CATEGORIES_DOC)?;
    let name = require_category(name)?;
    let (_, added) = register_category(db, &doc, name)?;
    Ok(added)
}

/// Listed spelling of `name`, adding it to the list when no category matches
/// ignoring case. The flag tells whether it was added.
fn register_category(
    db: &DocumentDb,
    categories_doc: &DocumentRef,
    name: String,
) -> Result<(String, bool), DbError> {
    let mut names = decode_fixed::<RecipeCategories>(db.get_document(categories_doc)?)?.names;
    if let Some(existing) = names.iter().find(|n| n.eq_ignore_ascii_case(&name)) {
        return Ok((existing.clone(), false));
    }
    names.push(name.clone());
    db.set_document(categories_doc, json!({ "names": names }))?;
    Ok((name, true))
}

/// Recipes of one category, newest first.
pub fn list_recipes(
    db: &DocumentDb,
    ctx: &TenantContext,
    category: &str,
) -> Result<Vec<Recipe>, ServiceError> {
    let coll = recipes_in(ctx, &require_category(category)?)?;
    list_newest(db, &coll)
}

pub fn get_recipe(
    db: &DocumentDb,
    ctx: &TenantContext,
    category: &str,
    id: &str,
) -> Result<Option<Recipe>, ServiceError> {
    let doc = recipes_in(ctx, &require_category(category)?)?.doc(id);
    match db.get_document(&doc)? {
        Some(stored) => Ok(Some(Recipe::from_document(&stored)?)),
        None => Ok(None),
    }
}

/// Save a recipe under its category, adding the category if it is new.
/// A category typed in another case is filed under the listed spelling.
/// Needs a name, at least one ingredient and at least one instruction.
pub fn add_recipe(
    db: &DocumentDb,
    ctx: &TenantContext,
    recipe: &NewRecipe,
) -> Result<String, ServiceError> {
    let categories_doc = ctx.document(RECIPES, RECIPE_CATEGORIES_DOC)?;
    let category = require_category(&recipe.category)?;
    let name = require_text(&recipe.name, "Recipe name")?;
    let ingredients = clean_lines(&recipe.ingredients);
    if ingredients.is_empty() {
        return Err(ServiceError::Validation(
            "At least one ingredient is required".to_string(),
        ));
    }
    let instructions = clean_lines(&recipe.instructions);
    if instructions.is_empty() {
        return Err(ServiceError::Validation(
            "At least one instruction is required".to_string(),
        ));
    }

    let image = recipe
        .image
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    // Category and recipe are written together or not at all
    let (category, doc) = db.with_transaction(|db| {
        let (category, _) = register_category(db, &categories_doc, category)?;
        let doc = db.add_document(
            &categories_doc.collection(&category),
            json!({
                "recipe name": name,
                "category": category,
                "ingredients": ingredients,
                "instructions": instructions,
                "notes": recipe.notes.trim(),
                "image": image,
            }),
        )?;
        Ok((category, doc))
    })?;
    log::info!("Recipe '{}' added to {}", name, category);
    Ok(doc.id().to_string())
}

pub fn delete_recipe(
    db: &DocumentDb,
    ctx: &TenantContext,
    category: &str,
    id: &str,
) -> Result<(), ServiceError> {
    let doc = recipes_in(ctx, &require_category(category)?)?.doc(id);
    if !db.delete_document(&doc)? {
        return Err(DbError::NotFound(doc.path()).into());
    }
    Ok(())
}
