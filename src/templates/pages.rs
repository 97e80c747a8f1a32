//! Page views: a shared layout plus one function per page.

use maud::{html, Markup, DOCTYPE};

use super::{human_date, TemplateData};

/// Expiry choices offered on the create form, in days
const EXPIRY_OPTIONS: [(u32, &str); 3] = [(365, "One Year"), (7, "One Week"), (1, "One Day")];

/// Shared layout. Styles come from `/static/css/main.css`; the content
/// security policy forbids inline ones.
fn base(title: &str, data: &TemplateData, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) " - Snippetbox" }
                link rel="stylesheet" href="/static/css/main.css";
                link rel="shortcut icon" href="/static/img/favicon.ico" type="image/x-icon";
            }
            body {
                header {
                    h1 { a href="/" { "Snippetbox" } }
                }
                (nav())
                main { (content) }
                footer { "Powered by Rust in " (data.current_year) }
            }
        }
    }
}

fn nav() -> Markup {
    html! {
        nav {
            a href="/" { "Home" }
            a href="/snippet/create" { "Create snippet" }
        }
    }
}

pub fn home(data: &TemplateData) -> Markup {
    let content = html! {
        h2 { "Latest Snippets" }
        @if data.snippets.is_empty() {
            p { "There's nothing to see here... yet!" }
        } @else {
            table {
                tr {
                    th { "Title" }
                    th { "Created" }
                    th { "ID" }
                }
                @for snippet in &data.snippets {
                    tr {
                        td { a href={ "/snippet/view/" (snippet.id) } { (snippet.title) } }
                        td { (human_date(snippet.created)) }
                        td { "#" (snippet.id) }
                    }
                }
            }
        }
    };
    base("Home", data, content)
}

pub fn view(data: &TemplateData) -> Markup {
    let title = data
        .snippet
        .as_ref()
        .map_or_else(|| "Snippet".to_string(), |s| format!("Snippet #{}", s.id));

    let content = html! {
        @if let Some(snippet) = &data.snippet {
            div.snippet {
                div.metadata {
                    strong { (snippet.title) }
                    span { "#" (snippet.id) }
                }
                pre { code { (snippet.content) } }
                div.metadata {
                    time { "Created: " (human_date(snippet.created)) }
                    time { "Expires: " (human_date(snippet.expires)) }
                }
            }
        }
    };
    base(&title, data, content)
}

pub fn create(data: &TemplateData) -> Markup {
    let content = html! {
        form action="/snippet/create" method="POST" {
            div {
                label for="title" { "Title:" }
                input type="text" id="title" name="title";
            }
            div {
                label for="content" { "Content:" }
                textarea id="content" name="content" {}
            }
            div {
                label { "Delete in:" }
                @for (index, (days, label)) in EXPIRY_OPTIONS.iter().enumerate() {
                    @if index == 0 {
                        input type="radio" name="expires" value=(days) checked;
                    } @else {
                        input type="radio" name="expires" value=(days);
                    }
                    " " (label) " "
                }
            }
            div {
                input type="submit" value="Publish snippet";
            }
        }
    };
    base("Create a New Snippet", data, content)
}
