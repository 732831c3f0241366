#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumVariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Text {
    Cancel,
    Copied,
    Delete,
    DeleteConfirm,
    DeleteSuccess,
    DeleteTip,
    NoItemsSelected,
}

impl Locale {
    /// Unknown locales fall back to English.
    pub fn parse(text: &str) -> Locale {
        return text.parse::<Locale>().unwrap_or_default();
    }

    pub fn text(&self, text: Text) -> &'static str {
        match (self, text) {
            (Locale::En, Text::Cancel) => return "Cancel",
            (Locale::En, Text::Copied) => return "Copied",
            (Locale::En, Text::Delete) => return "Delete",
            (Locale::En, Text::DeleteConfirm) => return "Are you sure you want to delete?",
            (Locale::En, Text::DeleteSuccess) => return "Delete success",
            (Locale::En, Text::DeleteTip) => return "This cannot be undone.",
            (Locale::En, Text::NoItemsSelected) => return "No items selected",
            (Locale::Zh, Text::Cancel) => return "取消",
            (Locale::Zh, Text::Copied) => return "已复制",
            (Locale::Zh, Text::Delete) => return "删除",
            (Locale::Zh, Text::DeleteConfirm) => return "确定要删除吗？",
            (Locale::Zh, Text::DeleteSuccess) => return "删除成功",
            (Locale::Zh, Text::DeleteTip) => return "删除后无法恢复。",
            (Locale::Zh, Text::NoItemsSelected) => return "未选择任何项目",
        }
    }
}
