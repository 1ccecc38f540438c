use axum::response::Html;
use tera::{Context, Tera};

use crate::db::User;

/// Colours offered on the new-user form.
pub const COLORS: [&str; 6] = ["teal", "powderblue", "red", "orange", "yellow", "green"];

pub fn load() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        ("index.html", include_str!("../templates/index.html")),
        ("new.html", include_str!("../templates/new.html")),
    ])?;
    Ok(tera)
}

pub fn index(
    tera: &Tera,
    current: &User,
    users: &[User],
    countries: &[String],
) -> Result<Html<String>, tera::Error> {
    let mut context = Context::new();
    context.insert("current", current);
    context.insert("users", users);
    context.insert("countries", countries);
    context.insert("total", &countries.len());

    tera.render("index.html", &context).map(Html)
}

pub fn new_user(tera: &Tera) -> Result<Html<String>, tera::Error> {
    let mut context = Context::new();
    context.insert("colors", &COLORS);

    tera.render("new.html", &context).map(Html)
}
