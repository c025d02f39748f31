pub mod final_section_editor;
