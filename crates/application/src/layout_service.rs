use std::sync::Arc;

use parrot_core::{AppError, AppResult};
use serde_json::Value;

use crate::form_service::{Form, FormState};
use crate::markup::{Markup, escape};

/// Node of a page layout tree.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    /// Titled section.
    Section {
        /// Heading.
        title: String,
        /// Optional lead text.
        subtitle: Option<String>,
        /// Nested nodes.
        children: Vec<LayoutNode>,
    },
    /// Horizontal row of columns.
    Row(Vec<LayoutNode>),
    /// Column spanning `span` of twelve grid tracks.
    Column {
        /// Track count, 1 to 12.
        span: u8,
        /// Nested nodes.
        children: Vec<LayoutNode>,
    },
    /// Even grid of items.
    Grid {
        /// Number of columns.
        columns: u8,
        /// Gap between items in rem.
        gap: u8,
        /// Items in placement order.
        items: Vec<LayoutItem>,
    },
    /// Card with an optional header.
    Card {
        /// Header text.
        title: Option<String>,
        /// Card body.
        children: Vec<LayoutNode>,
    },
    /// Width-constrained wrapper.
    Container(Vec<LayoutNode>),
    /// Horizontal rule.
    Divider,
    /// Vertical whitespace of the given size step.
    Spacer(u8),
    /// Trusted raw markup.
    Html(String),
    /// Client-side component mount point.
    View {
        /// Component name.
        component: String,
        /// Component properties.
        props: Value,
    },
    /// Widget of the bound form's field.
    Field(String),
}

/// Cell of a layout grid filled by an item callback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutItem {
    widgets: Vec<LayoutNode>,
}

impl LayoutItem {
    /// Places a field widget of the bound form.
    pub fn field(&mut self, name: &str) -> &mut Self {
        self.widgets.push(LayoutNode::Field(name.trim().to_owned()));
        self
    }

    /// Places trusted raw markup.
    pub fn html(&mut self, content: &str) -> &mut Self {
        self.widgets.push(LayoutNode::Html(content.to_owned()));
        self
    }

    /// Places a component mount point.
    pub fn view(&mut self, component: &str, props: Value) -> &mut Self {
        self.widgets.push(LayoutNode::View {
            component: component.to_owned(),
            props,
        });
        self
    }

    /// Returns the placed widgets.
    #[must_use]
    pub fn widgets(&self) -> &[LayoutNode] {
        &self.widgets
    }
}

/// Accumulates layout nodes; nested scopes receive a child builder.
#[derive(Debug, Default)]
pub struct LayoutBuilder {
    nodes: Vec<LayoutNode>,
    form: Option<Arc<Form>>,
    error: Option<AppError>,
}

/// Immutable layout produced by [`LayoutBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    nodes: Vec<LayoutNode>,
    form: Option<Arc<Form>>,
}

impl LayoutBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a form whose fields can be placed as widgets.
    ///
    /// Bind the form before opening scopes so item callbacks can see it.
    #[must_use]
    pub fn with_form(mut self, form: Form) -> Self {
        self.form = Some(Arc::new(form));
        self
    }

    /// Adds a titled section.
    #[must_use]
    pub fn section<F>(self, title: &str, subtitle: Option<&str>, build: F) -> Self
    where
        F: FnOnce(LayoutBuilder) -> LayoutBuilder,
    {
        let title = title.to_owned();
        let subtitle = subtitle.map(str::to_owned);
        self.scope(build, |children| LayoutNode::Section {
            title,
            subtitle,
            children,
        })
    }

    /// Adds a row.
    #[must_use]
    pub fn row<F>(self, build: F) -> Self
    where
        F: FnOnce(LayoutBuilder) -> LayoutBuilder,
    {
        self.scope(build, LayoutNode::Row)
    }

    /// Adds a column spanning `span` of twelve tracks.
    #[must_use]
    pub fn column<F>(mut self, span: u8, build: F) -> Self
    where
        F: FnOnce(LayoutBuilder) -> LayoutBuilder,
    {
        if !(1..=12).contains(&span) {
            self.error.get_or_insert(AppError::Configuration(format!(
                "layout column span must be between 1 and 12, got {span}"
            )));
        }
        self.scope(build, |children| LayoutNode::Column { span, children })
    }

    /// Adds a grid whose items are filled by `build`.
    #[must_use]
    pub fn grid<F>(mut self, columns: u8, gap: u8, build: F) -> Self
    where
        F: FnOnce(&mut GridScope<'_>),
    {
        if columns == 0 {
            self.error.get_or_insert(AppError::Configuration(
                "layout grid must have at least one column".to_owned(),
            ));
        }

        let mut scope = GridScope {
            form: self.form.as_deref(),
            items: Vec::new(),
        };
        build(&mut scope);
        let items = scope.items;
        self.nodes.push(LayoutNode::Grid {
            columns,
            gap,
            items,
        });
        self
    }

    /// Adds a card.
    #[must_use]
    pub fn card<F>(self, title: Option<&str>, build: F) -> Self
    where
        F: FnOnce(LayoutBuilder) -> LayoutBuilder,
    {
        let title = title.map(str::to_owned);
        self.scope(build, |children| LayoutNode::Card { title, children })
    }

    /// Adds a container.
    #[must_use]
    pub fn container<F>(self, build: F) -> Self
    where
        F: FnOnce(LayoutBuilder) -> LayoutBuilder,
    {
        self.scope(build, LayoutNode::Container)
    }

    /// Adds a horizontal rule.
    #[must_use]
    pub fn divider(mut self) -> Self {
        self.nodes.push(LayoutNode::Divider);
        self
    }

    /// Adds vertical whitespace.
    #[must_use]
    pub fn spacer(mut self, size: u8) -> Self {
        self.nodes.push(LayoutNode::Spacer(size));
        self
    }

    /// Adds trusted raw markup.
    #[must_use]
    pub fn html(mut self, content: &str) -> Self {
        self.nodes.push(LayoutNode::Html(content.to_owned()));
        self
    }

    /// Adds a component mount point.
    #[must_use]
    pub fn view(mut self, component: &str, props: Value) -> Self {
        self.nodes.push(LayoutNode::View {
            component: component.to_owned(),
            props,
        });
        self
    }

    /// Places a field widget of the bound form.
    #[must_use]
    pub fn field(mut self, name: &str) -> Self {
        self.nodes.push(LayoutNode::Field(name.trim().to_owned()));
        self
    }

    /// Validates field references and produces the immutable layout.
    pub fn build(self) -> AppResult<Layout> {
        if let Some(error) = self.error {
            return Err(error);
        }

        check_fields(&self.nodes, self.form.as_deref())?;

        Ok(Layout {
            nodes: self.nodes,
            form: self.form,
        })
    }

    fn scope<F, N>(mut self, build: F, node: N) -> Self
    where
        F: FnOnce(LayoutBuilder) -> LayoutBuilder,
        N: FnOnce(Vec<LayoutNode>) -> LayoutNode,
    {
        let child = build(LayoutBuilder {
            nodes: Vec::new(),
            form: self.form.clone(),
            error: None,
        });
        if let Some(error) = child.error {
            self.error.get_or_insert(error);
        }
        self.nodes.push(node(child.nodes));
        self
    }
}

/// Grid scope handed to [`LayoutBuilder::grid`] callbacks.
#[derive(Debug)]
pub struct GridScope<'a> {
    form: Option<&'a Form>,
    items: Vec<LayoutItem>,
}

impl GridScope<'_> {
    /// Adds one item filled by `callback`, which sees the bound form.
    pub fn item<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce(Option<&Form>, &mut LayoutItem),
    {
        let mut item = LayoutItem::default();
        callback(self.form, &mut item);
        self.items.push(item);
        self
    }
}

fn check_fields(nodes: &[LayoutNode], form: Option<&Form>) -> AppResult<()> {
    for node in nodes {
        match node {
            LayoutNode::Field(name) => {
                let Some(form) = form else {
                    return Err(AppError::Configuration(format!(
                        "layout places field '{name}' but no form is bound"
                    )));
                };
                if form.field(name).is_none() {
                    return Err(AppError::Configuration(format!(
                        "layout references unknown field '{name}'"
                    )));
                }
            }
            LayoutNode::Section { children, .. }
            | LayoutNode::Row(children)
            | LayoutNode::Column { children, .. }
            | LayoutNode::Card { children, .. }
            | LayoutNode::Container(children) => check_fields(children, form)?,
            LayoutNode::Grid { items, .. } => {
                for item in items {
                    check_fields(item.widgets(), form)?;
                }
            }
            LayoutNode::Divider
            | LayoutNode::Spacer(_)
            | LayoutNode::Html(_)
            | LayoutNode::View { .. } => {}
        }
    }

    Ok(())
}

impl Layout {
    /// Returns the top-level nodes.
    #[must_use]
    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    /// Returns the bound form.
    #[must_use]
    pub fn form(&self) -> Option<&Form> {
        self.form.as_deref()
    }

    /// Renders the tree in a single depth-first pass.
    #[must_use]
    pub fn render(&self, state: &FormState) -> Markup {
        let mut markup = Markup::default();
        for node in &self.nodes {
            self.render_node(&mut markup, node, state);
        }
        markup
    }

    fn render_children(&self, markup: &mut Markup, children: &[LayoutNode], state: &FormState) {
        for child in children {
            self.render_node(markup, child, state);
        }
    }

    fn render_node(&self, markup: &mut Markup, node: &LayoutNode, state: &FormState) {
        match node {
            LayoutNode::Section {
                title,
                subtitle,
                children,
            } => {
                markup.push_raw(&format!(
                    "<section class=\"layout-section\"><header><h2>{}</h2>",
                    escape(title)
                ));
                if let Some(subtitle) = subtitle {
                    markup.push_raw(&format!("<p class=\"subtitle\">{}</p>", escape(subtitle)));
                }
                markup.push_raw("</header>");
                self.render_children(markup, children, state);
                markup.push_raw("</section>");
            }
            LayoutNode::Row(children) => {
                markup.push_raw("<div class=\"row\">");
                self.render_children(markup, children, state);
                markup.push_raw("</div>");
            }
            LayoutNode::Column { span, children } => {
                markup.push_raw(&format!("<div class=\"col col-{span}\">"));
                self.render_children(markup, children, state);
                markup.push_raw("</div>");
            }
            LayoutNode::Grid {
                columns,
                gap,
                items,
            } => {
                markup.push_raw(&format!(
                    "<div class=\"layout-grid\" style=\"grid-template-columns: repeat({columns}, minmax(0, 1fr)); gap: {gap}rem\">"
                ));
                for item in items {
                    markup.push_raw("<div class=\"layout-grid-item\">");
                    self.render_children(markup, item.widgets(), state);
                    markup.push_raw("</div>");
                }
                markup.push_raw("</div>");
            }
            LayoutNode::Card { title, children } => {
                markup.push_raw("<div class=\"card\">");
                if let Some(title) = title {
                    markup.push_raw(&format!(
                        "<div class=\"card-header\">{}</div>",
                        escape(title)
                    ));
                }
                markup.push_raw("<div class=\"card-body\">");
                self.render_children(markup, children, state);
                markup.push_raw("</div></div>");
            }
            LayoutNode::Container(children) => {
                markup.push_raw("<div class=\"container\">");
                self.render_children(markup, children, state);
                markup.push_raw("</div>");
            }
            LayoutNode::Divider => markup.push_raw("<hr class=\"layout-divider\">"),
            LayoutNode::Spacer(size) => {
                markup.push_raw(&format!("<div class=\"layout-spacer spacer-{size}\"></div>"));
            }
            LayoutNode::Html(content) => markup.push_raw(content),
            LayoutNode::View { component, props } => markup.push_raw(&format!(
                "<div data-component=\"{}\" data-props=\"{}\"></div>",
                escape(component),
                escape(&props.to_string())
            )),
            LayoutNode::Field(name) => {
                if let Some(widget) = self
                    .form()
                    .and_then(|form| form.render_field(name, state))
                {
                    markup.push(&widget);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use parrot_core::AppError;
    use serde_json::json;

    use super::{LayoutBuilder, LayoutNode};
    use crate::form_service::{FieldContainer, Form, FormBuilder, FormState};

    fn form() -> Form {
        FormBuilder::new()
            .text("title", |field| field.required())
            .textarea("summary", |field| field)
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn grid_items_see_the_bound_form() {
        let layout = LayoutBuilder::new()
            .with_form(form())
            .section("Quick documentation", Some("Draft a page"), |section| {
                section.grid(2, 1, |grid| {
                    grid.item(|form, item| {
                        if form.is_some_and(|form| form.field("title").is_some()) {
                            item.field("title");
                        }
                    })
                    .item(|_, item| {
                        item.field("summary");
                    });
                })
            })
            .build()
            .unwrap_or_else(|_| unreachable!());

        let html = layout.render(&FormState::new()).into_string();
        let title_at = html.find("name=\"title\"").unwrap_or_else(|| unreachable!());
        let summary_at = html.find("name=\"summary\"").unwrap_or_else(|| unreachable!());
        assert!(html.starts_with("<section class=\"layout-section\">"));
        assert!(title_at < summary_at);
    }

    #[test]
    fn unknown_fields_fail_the_build() {
        let result = LayoutBuilder::new()
            .with_form(form())
            .card(Some("Card"), |card| card.field("missing"))
            .build();
        assert!(matches!(result, Err(AppError::Configuration(message)) if message.contains("'missing'")));
    }

    #[test]
    fn field_widgets_require_a_bound_form() {
        let result = LayoutBuilder::new()
            .row(|row| row.column(6, |column| column.field("title")))
            .build();
        assert!(matches!(result, Err(AppError::Configuration(message)) if message.contains("no form")));
    }

    #[test]
    fn invalid_column_spans_are_rejected() {
        let result = LayoutBuilder::new().row(|row| row.column(13, |column| column)).build();
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn renders_depth_first_in_declaration_order() {
        let layout = LayoutBuilder::new()
            .container(|container| {
                container
                    .html("<p>one</p>")
                    .divider()
                    .spacer(2)
                    .view("stats-widget", json!({"resource": "users"}))
            })
            .html("<p>two</p>")
            .build()
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(layout.nodes().len(), 2);
        assert!(matches!(layout.nodes()[1], LayoutNode::Html(_)));
        let html = layout.render(&FormState::new()).into_string();
        assert_eq!(
            html,
            "<div class=\"container\"><p>one</p><hr class=\"layout-divider\"><div class=\"layout-spacer spacer-2\"></div><div data-component=\"stats-widget\" data-props=\"{&quot;resource&quot;:&quot;users&quot;}\"></div></div><p>two</p>"
        );
    }
}
