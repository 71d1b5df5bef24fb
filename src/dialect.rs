//! Dialects: which keywords, elements and sort keys each kind of resource
//! understands.
//!
//! A dialect is declared once with [`DialectBuilder`] and then shared by every
//! compile. The built-in dialects are available as statics.

use std::collections::HashMap;

// used for the keyword lookup table
use crate::OtherHasher;
// used for the static built-in dialects
use lazy_static::lazy_static;
use tracing::warn;

use crate::ast::Str;
use crate::datatype::FieldEnum;
use crate::element::{
    AnnotationElementField, GeneratedByAnnotation, GeneratedByElement, MetaAnnotationElementField,
    MetaTagElementField, NameFilterElementField, SourceTagElementField,
};
use crate::error::SemanticError;
use crate::field::*;
use crate::field_enum;
use crate::parser::EnumParser;
use crate::sort::{alias_key, SortDefinition};

/// Keywords that open a sort clause.
pub const ORDER_KEYWORDS: &[&str] = &["order", "sort"];

/// What the keyword of a clause resolved to.
pub enum Identify<'a, O: FieldEnum> {
    Order(&'a SortDefinition<O>),
    Field(&'a dyn GeneratedByIdentify),
}

pub struct Dialect<O: FieldEnum> {
    name: &'static str,
    fields: Vec<Box<dyn GeneratedByIdentify>>,
    keywords: HashMap<String, usize, OtherHasher>,
    sort: Option<SortDefinition<O>>,
    element: Option<Box<dyn GeneratedByElement>>,
    source_element: Option<Box<dyn GeneratedByElement>>,
    annotation: Option<Box<dyn GeneratedByAnnotation>>,
}
impl<O: FieldEnum> Dialect<O> {
    pub fn builder(name: &'static str) -> DialectBuilder<O> {
        DialectBuilder {
            name,
            fields: Vec::new(),
            sort: None,
            element: None,
            source_element: None,
            annotation: None,
        }
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn fields(&self) -> impl Iterator<Item = &dyn GeneratedByIdentify> {
        self.fields.iter().map(|f| f.as_ref())
    }
    pub fn element(&self) -> Option<&dyn GeneratedByElement> {
        self.element.as_deref()
    }
    pub fn source_element(&self) -> Option<&dyn GeneratedByElement> {
        self.source_element.as_deref()
    }
    pub fn annotation(&self) -> Option<&dyn GeneratedByAnnotation> {
        self.annotation.as_deref()
    }

    /// Resolves a keyword under the source flag of its item. Only restricted
    /// tokens can be keywords; anything unknown is left to the elements.
    pub fn identify(&self, s: &Str, source: bool) -> Result<Option<Identify<'_, O>>, SemanticError> {
        if !s.is_restricted() {
            return Ok(None);
        }
        let name = s.value.to_lowercase();
        if let Some(sort) = &self.sort {
            if ORDER_KEYWORDS.contains(&name.as_str()) {
                return Ok(Some(Identify::Order(sort)));
            }
        }
        if let Some(&index) = self.keywords.get(&alias_key(&name, source)) {
            return Ok(Some(Identify::Field(self.fields[index].as_ref())));
        }
        if self.keywords.contains_key(&alias_key(&name, !source)) {
            let identify = name;
            return Err(if source {
                SemanticError::ThisIdentifyCannotHaveSourceFlag { identify, span: s.span }
            }
            else {
                SemanticError::ThisIdentifyMustHaveSourceFlag { identify, span: s.span }
            });
        }
        Ok(None)
    }
}

pub struct DialectBuilder<O: FieldEnum> {
    name: &'static str,
    fields: Vec<Box<dyn GeneratedByIdentify>>,
    sort: Option<SortDefinition<O>>,
    element: Option<Box<dyn GeneratedByElement>>,
    source_element: Option<Box<dyn GeneratedByElement>>,
    annotation: Option<Box<dyn GeneratedByAnnotation>>,
}
impl<O: FieldEnum> DialectBuilder<O> {
    pub fn identify(mut self, field: impl GeneratedByIdentify + 'static) -> Self {
        self.fields.push(Box::new(field));
        self
    }
    pub fn order(mut self, sort: SortDefinition<O>) -> Self {
        self.sort = Some(sort);
        self
    }
    pub fn element(mut self, element: impl GeneratedByElement + 'static) -> Self {
        self.element = Some(Box::new(element));
        self
    }
    pub fn source_element(mut self, element: impl GeneratedByElement + 'static) -> Self {
        self.source_element = Some(Box::new(element));
        self
    }
    pub fn annotation(mut self, annotation: impl GeneratedByAnnotation + 'static) -> Self {
        self.annotation = Some(Box::new(annotation));
        self
    }
    pub fn build(self) -> Dialect<O> {
        let mut keywords = HashMap::default();
        for (index, field) in self.fields.iter().enumerate() {
            for alias in field.alias() {
                let alias = alias.to_lowercase();
                if keywords.insert(alias.clone(), index).is_some() {
                    warn!(dialect = self.name, alias = %alias, "keyword declared twice");
                }
            }
        }
        Dialect {
            name: self.name,
            fields: self.fields,
            keywords,
            sort: self.sort,
            element: self.element,
            source_element: self.source_element,
            annotation: self.annotation,
        }
    }
}

// ------------- Enums -------------
field_enum! {
    pub enum IllustOrder : "ILLUST_ORDER" {
        Id => "id",
        Score => "score",
        Ordinal => "ordinal",
        Partition => "partition",
        CreateTime => "create-time",
        UpdateTime => "update-time",
        SourceId => "source-id",
        SourceSite => "source-site",
    }
}
field_enum! {
    pub enum IllustType : "ILLUST_TYPE" {
        Image => "image",
        Video => "video",
    }
}
field_enum! {
    /// The kinds of metadata an illust still lacks.
    pub enum Tagme : "TAGME" {
        Tag => "tag",
        Author => "author",
        Topic => "topic",
        Source => "source",
    }
}
field_enum! {
    pub enum BookOrder : "BOOK_ORDER" {
        Id => "id",
        Score => "score",
        ImageCount => "image-count",
        CreateTime => "create-time",
        UpdateTime => "update-time",
    }
}
field_enum! {
    pub enum MetaOrder : "META_ORDER" {
        Id => "id",
        Name => "name",
        Score => "score",
        Count => "count",
        CreateTime => "create-time",
        UpdateTime => "update-time",
    }
}
field_enum! {
    pub enum AuthorType : "AUTHOR_TYPE" {
        Unknown => "unknown",
        Artist => "artist",
        Studio => "studio",
        Publication => "publication",
    }
}
field_enum! {
    pub enum TopicType : "TOPIC_TYPE" {
        Unknown => "unknown",
        Copyright => "copyright",
        Work => "work",
        Character => "character",
    }
}
field_enum! {
    pub enum TagType : "TAG_TYPE" {
        Tag => "tag",
        Addr => "addr",
        Virtual => "virtual",
    }
}
field_enum! {
    pub enum AnnotationTarget : "ANNOTATION_TARGET" {
        Tag => "tag",
        Author => "author",
        Topic => "topic",
        Artist => "artist",
        Studio => "studio",
        Publication => "publication",
        Copyright => "copyright",
        Work => "work",
        Character => "character",
    }
}
field_enum! {
    pub enum AnnotationOrder : "ANNOTATION_ORDER" {
        Id => "id",
        Name => "name",
        CreateTime => "create-time",
    }
}
field_enum! {
    pub enum SourceStatus : "SOURCE_STATUS" {
        NotEdited => "not-edited",
        Edited => "edited",
        Error => "error",
        Ignored => "ignored",
    }
}
field_enum! {
    pub enum SourceOrder : "SOURCE_ORDER" {
        SourceId => "source-id",
        SourceSite => "source-site",
        CreateTime => "create-time",
        UpdateTime => "update-time",
    }
}

// ------------- Built-in dialects -------------
fn illust() -> Dialect<IllustOrder> {
    Dialect::builder("illust")
        .order(SortDefinition::builder()
            .item(IllustOrder::Id, &["id"])
            .item(IllustOrder::Score, &["score", "s"])
            .item(IllustOrder::Ordinal, &["ordinal", "ord"])
            .item(IllustOrder::Partition, &["partition", "pt"])
            .item(IllustOrder::CreateTime, &["create-time", "create", "ct"])
            .item(IllustOrder::UpdateTime, &["update-time", "update", "ut"])
            .item(IllustOrder::SourceId, &["^id", "source-id"])
            .item(IllustOrder::SourceSite, &["^site", "source-site"])
            .build())
        .identify(flag_field("favorite", &["favorite", "f"]))
        .identify(flag_field("book_member", &["book-member", "bm"]))
        .identify(pattern_number_field("id", &["id"]))
        .identify(number_field("score", &["score", "s"]).nullable())
        .identify(date_field("partition", &["partition", "pt"]))
        .identify(date_field("ordinal", &["ordinal", "ord"]))
        .identify(date_field("create_time", &["create-time", "create", "ct"]))
        .identify(date_field("update_time", &["update-time", "update", "ut"]))
        .identify(pattern_string_field("description", &["description", "desc"], false))
        .identify(string_field("extension", &["extension", "ext"]))
        .identify(size_field("filesize", &["filesize", "size"]))
        .identify(times_number_field("resolution", &["resolution", "res"]))
        .identify(ratio_field("ratio", &["ratio"]))
        .identify(duration_field("duration", &["duration"]))
        .identify(pattern_number_field("source_id", &["^id", "source-id"]))
        .identify(pattern_number_field("source_page", &["^page", "source-page"]))
        .identify(string_field("source_page_name", &["^page-name", "^pn", "source-page-name"]))
        .identify(string_field("source_site", &["^site", "source-site"]))
        .identify(pattern_string_field("source_description", &["^description", "^desc", "source-description", "source-desc"], false))
        .identify(composition_field("tagme", &["tagme"], true, EnumParser::<Tagme>::names()))
        .identify(enum_field("type", &["type"], EnumParser::builder()
            .item(IllustType::Image, &["img"])
            .item(IllustType::Video, &["vid"])
            .build()))
        .element(MetaTagElementField)
        .source_element(SourceTagElementField)
        .annotation(AnnotationElementField)
        .build()
}

fn book() -> Dialect<BookOrder> {
    Dialect::builder("book")
        .order(SortDefinition::builder()
            .item(BookOrder::Id, &["id"])
            .item(BookOrder::Score, &["score", "s"])
            .item(BookOrder::ImageCount, &["image-count", "count"])
            .item(BookOrder::CreateTime, &["create-time", "create", "ct"])
            .item(BookOrder::UpdateTime, &["update-time", "update", "ut"])
            .build())
        .identify(pattern_number_field("id", &["id"]))
        .identify(flag_field("favorite", &["favorite", "f"]))
        .identify(number_field("score", &["score", "s"]).nullable())
        .identify(number_field("image_count", &["image-count", "count"]))
        .identify(date_field("create_time", &["create-time", "create", "ct"]))
        .identify(date_field("update_time", &["update-time", "update", "ut"]))
        .identify(pattern_string_field("title", &["title"], false))
        .identify(pattern_string_field("description", &["description", "desc"], false))
        .element(MetaTagElementField)
        .annotation(AnnotationElementField)
        .build()
}

fn meta_order() -> SortDefinition<MetaOrder> {
    SortDefinition::builder()
        .item(MetaOrder::Id, &["id"])
        .item(MetaOrder::Name, &["name", "n"])
        .item(MetaOrder::Score, &["score", "s"])
        .item(MetaOrder::Count, &["count"])
        .item(MetaOrder::CreateTime, &["create-time", "create", "ct"])
        .item(MetaOrder::UpdateTime, &["update-time", "update", "ut"])
        .build()
}

fn author() -> Dialect<MetaOrder> {
    Dialect::builder("author")
        .order(meta_order())
        .identify(pattern_string_field("name", &["name", "n"], false))
        .identify(pattern_string_field("description", &["description", "desc"], false))
        .identify(enum_field("type", &["type"], EnumParser::<AuthorType>::names()))
        .identify(flag_field("favorite", &["favorite", "f"]))
        .identify(number_field("score", &["score", "s"]).nullable())
        .identify(number_field("count", &["count"]))
        .element(NameFilterElementField)
        .annotation(MetaAnnotationElementField)
        .build()
}

fn topic() -> Dialect<MetaOrder> {
    Dialect::builder("topic")
        .order(meta_order())
        .identify(pattern_string_field("name", &["name", "n"], false))
        .identify(pattern_string_field("description", &["description", "desc"], false))
        .identify(enum_field("type", &["type"], EnumParser::<TopicType>::names()))
        .identify(flag_field("favorite", &["favorite", "f"]))
        .identify(number_field("score", &["score", "s"]).nullable())
        .identify(number_field("count", &["count"]))
        .element(NameFilterElementField)
        .annotation(MetaAnnotationElementField)
        .build()
}

fn tag() -> Dialect<MetaOrder> {
    Dialect::builder("tag")
        .order(meta_order())
        .identify(pattern_string_field("name", &["name", "n"], false))
        .identify(pattern_string_field("description", &["description", "desc"], false))
        .identify(enum_field("type", &["type"], EnumParser::<TagType>::names()))
        .identify(number_field("score", &["score", "s"]).nullable())
        .identify(number_field("count", &["count"]))
        .element(NameFilterElementField)
        .annotation(MetaAnnotationElementField)
        .build()
}

fn annotation() -> Dialect<AnnotationOrder> {
    Dialect::builder("annotation")
        .order(SortDefinition::builder()
            .item(AnnotationOrder::Id, &["id"])
            .item(AnnotationOrder::Name, &["name", "n"])
            .item(AnnotationOrder::CreateTime, &["create-time", "create", "ct"])
            .build())
        .identify(pattern_string_field("name", &["name", "n"], false))
        .identify(composition_field("target", &["target"], false, EnumParser::<AnnotationTarget>::names()))
        .identify(flag_field("can_be_exported", &["can-be-exported", "export"]))
        .element(NameFilterElementField)
        .build()
}

fn source_data() -> Dialect<SourceOrder> {
    Dialect::builder("source-data")
        .order(SortDefinition::builder()
            .item(SourceOrder::SourceId, &["^id", "source-id"])
            .item(SourceOrder::SourceSite, &["^site", "source-site"])
            .item(SourceOrder::CreateTime, &["create-time", "create", "ct"])
            .item(SourceOrder::UpdateTime, &["update-time", "update", "ut"])
            .build())
        .identify(pattern_number_field("source_id", &["^id", "source-id"]))
        .identify(string_field("source_site", &["^site", "source-site"]))
        .identify(pattern_string_field("title", &["title"], false))
        .identify(pattern_string_field("description", &["description", "desc"], false))
        .identify(enum_field("status", &["status"], EnumParser::builder()
            .item(SourceStatus::NotEdited, &["not_edited", "new"])
            .item(SourceStatus::Edited, &[])
            .item(SourceStatus::Error, &[])
            .item(SourceStatus::Ignored, &["ignore"])
            .build()))
        .source_element(SourceTagElementField)
        .build()
}

lazy_static! {
    pub static ref ILLUST: Dialect<IllustOrder> = illust();
    pub static ref BOOK: Dialect<BookOrder> = book();
    pub static ref AUTHOR: Dialect<MetaOrder> = author();
    pub static ref TOPIC: Dialect<MetaOrder> = topic();
    pub static ref TAG: Dialect<MetaOrder> = tag();
    pub static ref ANNOTATION: Dialect<AnnotationOrder> = annotation();
    pub static ref SOURCE_DATA: Dialect<SourceOrder> = source_data();
}

/// Names accepted wherever a dialect is chosen by name.
pub const DIALECT_NAMES: &[&str] = &["illust", "book", "author", "topic", "tag", "annotation", "source-data"];
