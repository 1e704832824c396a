//! Package round-trip tests
//!
//! A package opened and saved without modification must keep every part's
//! content, and parts that were never parsed must be carried over as-is.

mod untouched_content {
    use trackless_ooxml::test_utils::DocxBuilder;
    use trackless_ooxml::{PartKind, WmlDocument};

    #[test]
    fn test_parts_survive_save_and_reopen() {
        let bytes = DocxBuilder::new(
            r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t xml:space="preserve"> spaced </w:t></w:r></w:p>"#,
        )
        .header("<w:p><w:r><w:t>Header</w:t></w:r></w:p>")
        .footer("<w:p><w:r><w:t>Footer</w:t></w:r></w:p>")
        .endnotes(r#"<w:endnote w:id="0"><w:p/></w:endnote>"#)
        .build()
        .unwrap();

        let doc = WmlDocument::from_bytes(&bytes).unwrap();
        let resaved = doc.to_bytes().unwrap();
        let reopened = WmlDocument::from_bytes(&resaved).unwrap();

        assert_eq!(reopened.parts().len(), doc.parts().len());
        for (before, after) in doc.parts().iter().zip(reopened.parts()) {
            assert_eq!(before.path, after.path);
            assert_eq!(before.kind, after.kind);
            assert_eq!(before.content, after.content);
        }
        assert_eq!(
            reopened.main_document().unwrap().content.root.text(),
            " spaced "
        );
        assert!(reopened
            .parts()
            .iter()
            .any(|p| p.kind == PartKind::Endnotes));
    }

    #[test]
    fn test_unparsed_files_are_kept() {
        let mut archive = DocxBuilder::new("<w:p/>").into_archive().unwrap();
        archive.set("word/media/image1.png", vec![1, 2, 3]);
        archive.set_string("docProps/core.xml", "<cp:coreProperties/>");

        let doc = WmlDocument::from_archive(archive).unwrap();
        let saved = doc.to_archive().unwrap();

        assert_eq!(saved.get("word/media/image1.png"), Some(&[1u8, 2, 3][..]));
        assert_eq!(
            saved.get_string("docProps/core.xml").as_deref(),
            Some("<cp:coreProperties/>")
        );
    }

    #[test]
    fn test_only_replaced_parts_are_reserialized() {
        let archive = DocxBuilder::new("<w:p/>")
            .header("<w:p><w:r><w:t>Header</w:t></w:r></w:p>")
            .into_archive()
            .unwrap();
        let original_header = archive.get("word/header1.xml").unwrap().to_vec();
        let original_order: Vec<String> = archive.file_list().map(str::to_string).collect();

        let mut doc = WmlDocument::from_archive(archive).unwrap();
        let main = doc.main_document().unwrap().clone();
        doc.replace_part(main);

        let saved = doc.to_archive().unwrap();
        assert_eq!(saved.get("word/header1.xml"), Some(original_header.as_slice()));
        assert!(doc.is_modified("word/document.xml"));
        assert!(!doc.is_modified("word/header1.xml"));

        let saved_order: Vec<String> = saved.file_list().map(str::to_string).collect();
        assert_eq!(saved_order, original_order);
    }
}

mod discovery {
    use trackless_ooxml::relationships::Relationships;
    use trackless_ooxml::test_utils::document_xml;
    use trackless_ooxml::{OoxmlArchive, PartKind, WmlDocument};

    #[test]
    fn test_main_part_found_through_root_relationships() {
        let mut archive = OoxmlArchive::new();
        archive.set_string(
            "_rels/.rels",
            format!(
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}" Target="/content/main.xml"/></Relationships>"#,
                Relationships::TYPE_OFFICE_DOCUMENT
            ),
        );
        archive.set_string("content/main.xml", document_xml("<w:p/>"));
        archive.set_string(
            "content/_rels/main.xml.rels",
            format!(
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}" Target="notes/footnotes.xml"/><Relationship Id="rId2" Type="{}" Target="http://example.com/x.xml" TargetMode="External"/></Relationships>"#,
                Relationships::TYPE_FOOTNOTES,
                Relationships::TYPE_HEADER
            ),
        );
        archive.set_string(
            "content/notes/footnotes.xml",
            r#"<w:footnotes xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#,
        );

        let doc = WmlDocument::from_archive(archive).unwrap();
        let paths: Vec<_> = doc.parts().iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["content/main.xml", "content/notes/footnotes.xml"]);
        assert_eq!(doc.parts()[1].kind, PartKind::Footnotes);
    }

    #[test]
    fn test_missing_relationship_target_is_skipped() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("word/document.xml", document_xml("<w:p/>"));
        archive.set_string(
            "word/_rels/document.xml.rels",
            format!(
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}" Target="footer9.xml"/></Relationships>"#,
                Relationships::TYPE_FOOTER
            ),
        );

        let doc = WmlDocument::from_archive(archive).unwrap();
        assert_eq!(doc.parts().len(), 1);
    }
}
