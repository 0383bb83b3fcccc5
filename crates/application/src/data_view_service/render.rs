use super::*;

impl GridConfig {
    /// Renders toolbar, table and pagination for an executed page.
    #[must_use]
    pub fn render_table(&self, request: &GridRequest, result: &GridResult) -> Markup {
        let mut markup = Markup::raw(format!(
            "<div class=\"data-grid\" data-resource=\"{}\">",
            escape(self.resource())
        ));
        markup.push(&self.render_toolbar(request));

        let has_bulk = !self.bulk_actions().is_empty();
        // Row action forms cannot nest, so checkboxes join the bulk form by id.
        let bulk_form_id = format!("bulk-{}", escape(self.resource()));
        if has_bulk {
            markup.push_raw(&format!(
                "<form method=\"post\" action=\"{}/bulk\" id=\"{bulk_form_id}\" class=\"grid-bulk\">",
                escape(self.route_prefix().trim_end_matches('/'))
            ));
            markup.push_raw("<select name=\"action\" class=\"form-control\">");
            for bulk_action in self.bulk_actions() {
                let confirm = if bulk_action.action().requires_confirm() {
                    " data-confirm=\"true\""
                } else {
                    ""
                };
                markup.push_raw(&format!(
                    "<option value=\"{}\"{confirm}>{}</option>",
                    escape(bulk_action.key()),
                    escape(bulk_action.action().label())
                ));
            }
            markup.push_raw("</select><button type=\"submit\" class=\"btn\">Apply</button></form>");
        }

        markup.push_raw("<table class=\"table\"><thead><tr>");
        if has_bulk {
            markup.push_raw("<th class=\"select-all\"><input type=\"checkbox\" data-select-all></th>");
        }
        for column in self.columns() {
            markup.push(&self.render_header(column, request));
        }
        if !self.actions().is_empty() {
            markup.push_raw("<th class=\"actions\">Actions</th>");
        }
        markup.push_raw("</tr></thead><tbody>");

        if result.records.is_empty() {
            let span = self.columns().len()
                + usize::from(has_bulk)
                + usize::from(!self.actions().is_empty());
            markup.push_raw(&format!(
                "<tr class=\"empty\"><td colspan=\"{}\">No records found.</td></tr>",
                span.max(1)
            ));
        }

        for record in &result.records {
            let id = escape(record.id().as_str());
            markup.push_raw(&format!("<tr data-id=\"{id}\">"));
            if has_bulk {
                markup.push_raw(&format!(
                    "<td><input type=\"checkbox\" form=\"{bulk_form_id}\" name=\"ids\" value=\"{id}\"></td>"
                ));
            }
            for column in self.columns() {
                markup.push_raw("<td>");
                markup.push(&column.render_cell(record));
                markup.push_raw("</td>");
            }
            if !self.actions().is_empty() {
                markup.push_raw("<td class=\"actions\">");
                for action in self.actions() {
                    markup.push(&self.render_action(action, record));
                }
                markup.push_raw("</td>");
            }
            markup.push_raw("</tr>");
        }

        markup.push_raw("</tbody></table>");

        if self.paginated() {
            markup.push(&self.render_pagination(request, result));
        }
        markup.push_raw("</div>");

        markup
    }

    fn render_toolbar(&self, request: &GridRequest) -> Markup {
        if !self.searchable() && self.filters().is_empty() {
            return Markup::default();
        }

        let mut markup = Markup::raw("<form method=\"get\" class=\"grid-toolbar\">");
        if self.searchable() {
            markup.push_raw(&format!(
                "<input type=\"search\" name=\"search\" class=\"form-control\" placeholder=\"Search\" value=\"{}\">",
                escape(request.search().unwrap_or_default())
            ));
        }

        for filter in self.filters() {
            let key = escape(filter.key().as_str());
            let label = escape(filter.label());
            markup.push_raw(&format!("<label class=\"grid-filter\">{label} "));
            match filter.kind() {
                FilterKind::Text => markup.push_raw(&format!(
                    "<input type=\"text\" name=\"{key}\" value=\"{}\">",
                    escape(request.param(filter.key().as_str()).unwrap_or_default())
                )),
                FilterKind::Select { options } => {
                    let current = request.param(filter.key().as_str()).unwrap_or_default();
                    markup.push_raw(&format!("<select name=\"{key}\"><option value=\"\">All</option>"));
                    for (value, option_label) in options {
                        let selected = if value == current { " selected" } else { "" };
                        markup.push_raw(&format!(
                            "<option value=\"{}\"{selected}>{}</option>",
                            escape(value),
                            escape(option_label)
                        ));
                    }
                    markup.push_raw("</select>");
                }
                FilterKind::DateRange => {
                    for suffix in ["from", "to"] {
                        let name = format!("{}_{suffix}", filter.key().as_str());
                        markup.push_raw(&format!(
                            "<input type=\"date\" name=\"{}\" value=\"{}\">",
                            escape(&name),
                            escape(request.param(&name).unwrap_or_default())
                        ));
                    }
                }
                FilterKind::Boolean => {
                    let current = request
                        .param(filter.key().as_str())
                        .and_then(parse_flag);
                    markup.push_raw(&format!("<select name=\"{key}\"><option value=\"\">Any</option>"));
                    for (value, option_label, flag) in [("1", "Yes", true), ("0", "No", false)] {
                        let selected = if current == Some(flag) { " selected" } else { "" };
                        markup.push_raw(&format!(
                            "<option value=\"{value}\"{selected}>{option_label}</option>"
                        ));
                    }
                    markup.push_raw("</select>");
                }
            }
            markup.push_raw("</label>");
        }

        markup.push_raw("<button type=\"submit\" class=\"btn\">Filter</button></form>");
        markup
    }

    fn render_header(&self, column: &ColumnDescriptor, request: &GridRequest) -> Markup {
        let label = escape(column.label());
        if !column.is_sortable() {
            return Markup::raw(format!("<th>{label}</th>"));
        }

        let active = self
            .effective_sort(request)
            .filter(|sort| sort.field == column.key());
        let next_direction = active
            .as_ref()
            .map_or(SortDirection::Asc, |sort| sort.direction.toggled());
        let indicator = match active.map(|sort| sort.direction) {
            Some(SortDirection::Asc) => " &uarr;",
            Some(SortDirection::Desc) => " &darr;",
            None => "",
        };
        let query = request.query_string(&[
            ("sort", column.key().to_owned()),
            ("direction", next_direction.as_str().to_owned()),
            ("page", "1".to_owned()),
        ]);

        Markup::raw(format!(
            "<th class=\"sortable\"><a href=\"?{}\">{label}{indicator}</a></th>",
            escape(&query)
        ))
    }

    fn render_action(&self, action: &ActionDescriptor, record: &Record) -> Markup {
        let href = escape(&action.href(self.route_prefix(), record.id().as_str()));
        let label = escape(action.label());
        let icon = action
            .icon()
            .map(|icon| format!("<i class=\"icon icon-{}\"></i> ", escape(icon)))
            .unwrap_or_default();
        let confirm = if action.requires_confirm() {
            " data-confirm=\"Are you sure?\""
        } else {
            ""
        };

        if action.http_method() == HttpMethod::Get {
            return Markup::raw(format!(
                "<a href=\"{href}\" class=\"action action-{}\"{confirm}>{icon}{label}</a>",
                escape(action.key().as_str())
            ));
        }

        let spoofed = if action.http_method().is_native_form_method() {
            String::new()
        } else {
            format!(
                "<input type=\"hidden\" name=\"_method\" value=\"{}\">",
                action.http_method().as_str()
            )
        };
        Markup::raw(format!(
            "<form method=\"post\" action=\"{href}\" class=\"action action-{}\"{confirm}>{spoofed}<button type=\"submit\">{icon}{label}</button></form>",
            escape(action.key().as_str())
        ))
    }

    fn render_pagination(&self, request: &GridRequest, result: &GridResult) -> Markup {
        let mut markup = Markup::raw("<nav class=\"pagination\">");
        if result.current_page > 1 {
            let previous = result.current_page.min(result.total_pages + 1) - 1;
            markup.push_raw(&format!(
                "<a rel=\"prev\" href=\"?{}\">Previous</a>",
                escape(&request.query_string(&[("page", previous.to_string())]))
            ));
        }
        markup.push_raw(&format!(
            "<span class=\"page-info\">Page {} of {} ({} total)</span>",
            result.current_page, result.total_pages, result.total
        ));
        if result.current_page < result.total_pages {
            markup.push_raw(&format!(
                "<a rel=\"next\" href=\"?{}\">Next</a>",
                escape(&request.query_string(&[("page", (result.current_page + 1).to_string())]))
            ));
        }
        markup.push_raw("</nav>");

        markup
    }
}
