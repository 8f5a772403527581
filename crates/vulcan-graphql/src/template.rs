//! Multi-item query template and query builder.

use crate::error::QueryBuildError;
use crate::model::resolver_name_of;
use crate::operation::GraphqlQuery;

/// Arguments of the multi query template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiTemplateArgs<'a> {
    /// GraphQL type name, e.g. `Movie`.
    pub type_name: &'a str,
    /// List type name, e.g. `Movies`.
    pub multi_type_name: &'a str,
    /// Fragment spread into each result.
    pub fragment_name: &'a str,
    /// Extra root fields queried alongside the list.
    pub extra_queries: Option<&'a str>,
}

/// Arguments of [`build_multi_query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMultiQueryArgs<'a> {
    pub type_name: &'a str,
    pub multi_type_name: &'a str,
    pub fragment_name: &'a str,
    /// Fragment definition text appended to the document.
    pub fragment: &'a str,
    pub extra_queries: Option<&'a str>,
}

/// Render the query text fetching a page of `multi_type_name`.
///
/// Total count computation is requested through `input.enableTotal` on the
/// server side; the selection always lists `totalCount`.
#[must_use]
pub fn multi_client_template(args: MultiTemplateArgs<'_>) -> String {
    let MultiTemplateArgs {
        type_name,
        multi_type_name,
        fragment_name,
        extra_queries,
    } = args;
    let resolver_name = resolver_name_of(multi_type_name);
    let extra_queries = extra_queries.unwrap_or_default();
    format!(
        "query multi{type_name}Query($input: Multi{type_name}Input) {{\n  \
         {resolver_name}(input: $input) {{\n    \
         results {{\n      \
         ...{fragment_name}\n    \
         }}\n    \
         totalCount\n    \
         __typename\n  \
         }}\n  \
         {extra_queries}\n\
         }}"
    )
}

/// Build the full multi query document: template followed by the fragment.
///
/// Fragment text is not parsed here; a malformed fragment is reported by the
/// server when the query runs.
pub fn build_multi_query(args: BuildMultiQueryArgs<'_>) -> Result<GraphqlQuery, QueryBuildError> {
    for (field, value) in [
        ("type_name", args.type_name),
        ("multi_type_name", args.multi_type_name),
        ("fragment_name", args.fragment_name),
        ("fragment", args.fragment),
    ] {
        if value.trim().is_empty() {
            return Err(QueryBuildError::EmptyField(field));
        }
    }

    let template = multi_client_template(MultiTemplateArgs {
        type_name: args.type_name,
        multi_type_name: args.multi_type_name,
        fragment_name: args.fragment_name,
        extra_queries: args.extra_queries,
    });
    Ok(GraphqlQuery::new(format!("{template}\n{}\n", args.fragment)))
}
